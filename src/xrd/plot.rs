//! # 图像生成
//!
//! 使用 `plotters` 库绘制：
//! - 晶体视图：原子标记、尺寸标注箭头 (a, b, d) 与参数面板
//! - 扫描曲线：2d·sin(θ)/λ 随入射角变化，并标出各级 Bragg 角
//!
//! 支持 PNG 和 SVG 输出。
//!
//! ## 依赖关系
//! - 被 `commands/render.rs`, `commands/sweep.rs` 调用
//! - 使用 `xrd/projector.rs` 的 Projection
//! - 使用 `xrd/sweep.rs` 的 AngleSweep, BraggOrder

use crate::error::{Result, XrayError};
use crate::xrd::projector::{LabelAlign, Point, Projection, ATOM_RADIUS};
use crate::xrd::sweep::{AngleSweep, BraggOrder};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const ATOM_FILL: RGBColor = RGBColor(237, 69, 69);
const ATOM_EDGE: RGBColor = RGBColor(255, 0, 0);
const PANEL_FILL: RGBColor = RGBColor(240, 240, 240);
const PANEL_STROKE: RGBColor = RGBColor(128, 128, 128);

/// 箭头尺寸（像素）
const ARROW_TAIL_WIDTH: u32 = 2;
const ARROW_HEAD_WIDTH: f64 = 7.0;
const ARROW_HEAD_HEIGHT: f64 = 20.0;

/// 面板内边距与行距
const PANEL_INSET: i32 = 10;
const PANEL_LINE_HEIGHT: i32 = 28;

fn plot_err<E: std::fmt::Debug>(e: E) -> XrayError {
    XrayError::PlotError(format!("{:?}", e))
}

// ─────────────────────────────────────────────────────────────
// 晶体视图
// ─────────────────────────────────────────────────────────────

/// 生成晶体视图图像
pub fn render_crystal(
    projection: &Projection,
    panel_lines: &[&str],
    output_path: &Path,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_crystal(&root, projection, panel_lines, width)?;
        root.present().map_err(plot_err)?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_crystal(&root, projection, panel_lines, width)?;
        root.present().map_err(plot_err)?;
    }
    Ok(())
}

fn draw_crystal<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    projection: &Projection,
    panel_lines: &[&str],
    width: u32,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let (scene, side) = root.split_horizontally((width * 2 / 3) as i32);
    let (scene_w, scene_h) = scene.dim_in_pixel();
    let mapper = SceneMapper::fit(projection, scene_w, scene_h);

    for p in &projection.atom_positions {
        let center = mapper.to_px(p);
        scene
            .draw(&Circle::new(center, ATOM_RADIUS as i32, ATOM_FILL.filled()))
            .map_err(plot_err)?;
        scene
            .draw(&Circle::new(center, ATOM_RADIUS as i32, ATOM_EDGE.stroke_width(1)))
            .map_err(plot_err)?;
    }

    for arrow in projection.annotations.iter() {
        if arrow.is_degenerate() {
            continue;
        }
        let tail = mapper.to_px(&arrow.tail);
        let tip = mapper.to_px(&arrow.tip);
        draw_double_arrow(&scene, tail, tip)?;

        let (anchor, align) = arrow.label_anchor();
        let pos = match align {
            LabelAlign::TopCenter => Pos::new(HPos::Center, VPos::Top),
            LabelAlign::RightMiddle => Pos::new(HPos::Right, VPos::Center),
        };
        let style = ("sans-serif", 20).into_font().color(&BLACK).pos(pos);
        scene
            .draw(&Text::new(arrow.kind.label(), mapper.to_px(&anchor), style))
            .map_err(plot_err)?;
    }

    draw_panel(&side, panel_lines)
}

/// 绘制双头箭头
fn draw_double_arrow<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    tail: (i32, i32),
    tip: (i32, i32),
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    area.draw(&PathElement::new(
        vec![tail, tip],
        BLACK.stroke_width(ARROW_TAIL_WIDTH),
    ))
    .map_err(plot_err)?;

    let dx = (tip.0 - tail.0) as f64;
    let dy = (tip.1 - tail.1) as f64;
    let len = dx.hypot(dy);
    if len < 1.0 {
        return Ok(());
    }
    let (ux, uy) = (dx / len, dy / len);
    let head = ARROW_HEAD_HEIGHT.min(len / 3.0);
    let half = ARROW_HEAD_WIDTH / 2.0;

    for (end, dir) in [(tip, 1.0), (tail, -1.0)] {
        let (ex, ey) = (end.0 as f64, end.1 as f64);
        let bx = ex - dir * ux * head;
        let by = ey - dir * uy * head;
        let left = ((bx - uy * half) as i32, (by + ux * half) as i32);
        let right = ((bx + uy * half) as i32, (by - ux * half) as i32);
        area.draw(&Polygon::new(vec![end, left, right], BLACK.filled()))
            .map_err(plot_err)?;
    }

    Ok(())
}

/// 绘制参数面板
fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, lines: &[&str]) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (w, _) = area.dim_in_pixel();
    let bottom = 2 * PANEL_INSET + PANEL_LINE_HEIGHT * lines.len() as i32;

    area.draw(&Rectangle::new(
        [(0, PANEL_INSET), (w as i32 - PANEL_INSET, PANEL_INSET + bottom)],
        PANEL_FILL.filled(),
    ))
    .map_err(plot_err)?;
    area.draw(&Rectangle::new(
        [(0, PANEL_INSET), (w as i32 - PANEL_INSET, PANEL_INSET + bottom)],
        PANEL_STROKE.stroke_width(1),
    ))
    .map_err(plot_err)?;

    for (i, line) in lines.iter().enumerate() {
        let y = 2 * PANEL_INSET + i as i32 * PANEL_LINE_HEIGHT;
        area.draw(&Text::new(
            line.to_string(),
            (PANEL_INSET, y),
            ("sans-serif", 18).into_font().color(&BLACK),
        ))
        .map_err(plot_err)?;
    }

    Ok(())
}

/// 投影坐标到绘图区像素坐标的映射（居中，必要时缩小）
struct SceneMapper {
    cx: f64,
    cy: f64,
    fit: f64,
    half_w: f64,
    half_h: f64,
}

impl SceneMapper {
    const MARGIN: f64 = 40.0;

    fn fit(projection: &Projection, width: u32, height: u32) -> Self {
        let points: Vec<Point> = projection
            .atom_positions
            .iter()
            .copied()
            .chain(
                projection
                    .annotations
                    .iter()
                    .flat_map(|a| [a.tail, a.tip]),
            )
            .collect();

        let x_min = points.iter().map(|p| p.x).fold(0.0_f64, f64::min);
        let x_max = points.iter().map(|p| p.x).fold(0.0_f64, f64::max);
        let y_min = points.iter().map(|p| p.y).fold(0.0_f64, f64::min);
        let y_max = points.iter().map(|p| p.y).fold(0.0_f64, f64::max);

        let avail_w = (width as f64 - 2.0 * Self::MARGIN).max(1.0);
        let avail_h = (height as f64 - 2.0 * Self::MARGIN).max(1.0);
        let span_w = (x_max - x_min).max(1e-9);
        let span_h = (y_max - y_min).max(1e-9);

        Self {
            cx: (x_min + x_max) / 2.0,
            cy: (y_min + y_max) / 2.0,
            fit: (avail_w / span_w).min(avail_h / span_h).min(1.0),
            half_w: width as f64 / 2.0,
            half_h: height as f64 / 2.0,
        }
    }

    fn to_px(&self, p: &Point) -> (i32, i32) {
        (
            ((p.x - self.cx) * self.fit + self.half_w).round() as i32,
            ((p.y - self.cy) * self.fit + self.half_h).round() as i32,
        )
    }
}

// ─────────────────────────────────────────────────────────────
// 扫描曲线
// ─────────────────────────────────────────────────────────────

/// 生成扫描曲线图
pub fn render_sweep(
    sweep: &AngleSweep,
    orders: &[BraggOrder],
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_sweep_chart(&root, sweep, orders, title)?;
        root.present().map_err(plot_err)?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_sweep_chart(&root, sweep, orders, title)?;
        root.present().map_err(plot_err)?;
    }
    Ok(())
}

fn draw_sweep_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    sweep: &AngleSweep,
    orders: &[BraggOrder],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let points: Vec<(f64, f64)> = sweep
        .samples
        .iter()
        .filter_map(|s| s.ratio.map(|r| (s.theta_deg, r)))
        .collect();

    let x_min = sweep.samples.first().map(|s| s.theta_deg).unwrap_or(0.0);
    let mut x_max = sweep.samples.last().map(|s| s.theta_deg).unwrap_or(90.0);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    let y_top = points.iter().map(|(_, r)| *r).fold(1.0_f64, f64::max) * 1.1;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_top)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("θ (°)")
        .y_desc("2d sin(θ) / λ")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_err)?;

    // 整数级次参考线
    let guide = RGBColor(190, 190, 190);
    let mut n = 1.0;
    while n < y_top {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x_min, n), (x_max, n)],
                guide.stroke_width(1),
            )))
            .map_err(plot_err)?;
        n += 1.0;
    }

    let line_color = RGBColor(0, 102, 204);
    chart
        .draw_series(LineSeries::new(points, line_color.stroke_width(2)))
        .map_err(plot_err)?;

    // 解析 Bragg 角
    for order in orders {
        if order.theta_deg < x_min || order.theta_deg > x_max {
            continue;
        }
        let y = order.n as f64;
        chart
            .draw_series(std::iter::once(Circle::new(
                (order.theta_deg, y),
                5,
                RED.filled(),
            )))
            .map_err(plot_err)?;
        chart
            .draw_series(std::iter::once(Text::new(
                format!("n={} ({:.2}°)", order.n, order.theta_deg),
                (order.theta_deg, y + y_top * 0.02),
                ("sans-serif", 13).into_font().color(&BLACK),
            )))
            .map_err(plot_err)?;
    }

    let wavelength_text = format!("λ = {:.4} Å, d = {:.4} Å", sweep.wavelength, sweep.constants.z);
    chart
        .draw_series(std::iter::once(Text::new(
            wavelength_text,
            (x_min + (x_max - x_min) * 0.02, y_top * 0.95),
            ("sans-serif", 14).into_font().color(&BLACK),
        )))
        .map_err(plot_err)?;

    Ok(())
}
