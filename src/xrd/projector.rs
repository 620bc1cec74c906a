//! # 晶格到屏幕坐标的投影
//!
//! 把晶格位点按显示放大倍数映射为原子标记的像素坐标，
//! 并计算三个尺寸标注箭头 (a, b, d) 的端点。
//!
//! ## 标注箭头
//! 记 S = scale，(x, y, z) 为晶格常数，xMin/yMin 为位点坐标最小值（从 0 开始取）：
//! - a: (S·xMin, S·z) → (S·(xMin + x), S·z)，水平
//! - b: (S·xMin, 0)   → (S·xMin, S·z)，竖直
//! - d: (S·xMin, S·yMin) → (S·xMin, S·(yMin + z))，晶格下方竖直
//!
//! 空位点序列时所有箭头退化为原点处的零长度箭头。
//!
//! ## 依赖关系
//! - 被 `xrd/plot.rs`, `xrd/export.rs` 和 `commands/` 使用
//! - 使用 `models/lattice.rs`

use crate::error::{Result, XrayError};
use crate::models::{LatticeConstants, LatticeSite};

use serde::Serialize;

/// 默认显示放大倍数
pub const DISPLAY_SCALE: f64 = 8.0;

/// 原子标记半径（像素）
pub const ATOM_RADIUS: f64 = 5.0;

/// 竖直箭头标签与箭头的间距（像素）
pub const LABEL_GAP: f64 = 5.0;

/// 屏幕坐标点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 标注类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKind {
    A,
    B,
    D,
}

impl ArrowKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArrowKind::A => "a",
            ArrowKind::B => "b",
            ArrowKind::D => "d",
        }
    }
}

/// 标签对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAlign {
    /// 标签顶边中点对齐锚点
    TopCenter,
    /// 标签右边中点对齐锚点
    RightMiddle,
}

/// 双头尺寸标注箭头
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionArrow {
    pub kind: ArrowKind,
    pub tail: Point,
    pub tip: Point,
}

impl DimensionArrow {
    fn new(kind: ArrowKind, tail: Point, tip: Point) -> Self {
        Self { kind, tail, tip }
    }

    pub fn length(&self) -> f64 {
        (self.tip.x - self.tail.x).hypot(self.tip.y - self.tail.y)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.tail.x + self.tip.x) / 2.0,
            (self.tail.y + self.tip.y) / 2.0,
        )
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() == 0.0
    }

    /// 标签锚点：a 标签在箭头中心下方居中，b/d 标签在箭头左侧
    pub fn label_anchor(&self) -> (Point, LabelAlign) {
        let c = self.center();
        match self.kind {
            ArrowKind::A => (c, LabelAlign::TopCenter),
            ArrowKind::B | ArrowKind::D => {
                (Point::new(c.x - LABEL_GAP, c.y), LabelAlign::RightMiddle)
            }
        }
    }
}

/// 位点最小坐标（已缩放）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x_min: f64,
    pub y_min: f64,
}

/// 三个尺寸标注
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotations {
    pub a_arrow: DimensionArrow,
    pub b_arrow: DimensionArrow,
    pub d_arrow: DimensionArrow,
}

impl Annotations {
    fn degenerate() -> Self {
        let o = Point::new(0.0, 0.0);
        Self {
            a_arrow: DimensionArrow::new(ArrowKind::A, o, o),
            b_arrow: DimensionArrow::new(ArrowKind::B, o, o),
            d_arrow: DimensionArrow::new(ArrowKind::D, o, o),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionArrow> {
        [&self.a_arrow, &self.b_arrow, &self.d_arrow].into_iter()
    }
}

/// 投影结果
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub atom_positions: Vec<Point>,
    pub bounds: Bounds,
    pub annotations: Annotations,
}

/// 固定放大倍数的投影器
#[derive(Debug, Clone, Copy)]
pub struct LatticeProjector {
    scale: f64,
}

impl LatticeProjector {
    pub fn new(scale: f64) -> Result<Self> {
        validate_scale(scale)?;
        Ok(Self { scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn project(
        &self,
        sites: &[LatticeSite],
        constants: &LatticeConstants,
    ) -> Result<Projection> {
        project(sites, constants, self.scale)
    }
}

impl Default for LatticeProjector {
    fn default() -> Self {
        Self {
            scale: DISPLAY_SCALE,
        }
    }
}

fn validate_scale(scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(XrayError::InvalidArgument(format!(
            "display scale must be a positive finite number, got {}",
            scale
        )));
    }
    Ok(())
}

/// 计算原子像素坐标与标注箭头
pub fn project(
    sites: &[LatticeSite],
    constants: &LatticeConstants,
    scale: f64,
) -> Result<Projection> {
    validate_scale(scale)?;

    if !constants.is_finite() {
        return Err(XrayError::InvalidArgument(format!(
            "lattice constants must be finite, got ({}, {}, {})",
            constants.x, constants.y, constants.z
        )));
    }

    if let Some((index, site)) = sites.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        return Err(XrayError::InvalidCoordinate {
            index,
            x: site.x,
            y: site.y,
        });
    }

    if sites.is_empty() {
        return Ok(Projection {
            atom_positions: Vec::new(),
            bounds: Bounds::default(),
            annotations: Annotations::degenerate(),
        });
    }

    let atom_positions = sites
        .iter()
        .map(|s| Point::new(scale * s.x, scale * s.y))
        .collect();

    let x_min = sites.iter().map(|s| s.x).fold(0.0_f64, f64::min);
    let y_min = sites.iter().map(|s| s.y).fold(0.0_f64, f64::min);

    let s = scale;
    let c = constants;
    let annotations = Annotations {
        a_arrow: DimensionArrow::new(
            ArrowKind::A,
            Point::new(s * x_min, s * c.z),
            Point::new(s * (x_min + c.x), s * c.z),
        ),
        b_arrow: DimensionArrow::new(
            ArrowKind::B,
            Point::new(s * x_min, 0.0),
            Point::new(s * x_min, s * c.z),
        ),
        d_arrow: DimensionArrow::new(
            ArrowKind::D,
            Point::new(s * x_min, s * y_min),
            Point::new(s * x_min, s * (y_min + c.z)),
        ),
    };

    Ok(Projection {
        atom_positions,
        bounds: Bounds {
            x_min: s * x_min,
            y_min: s * y_min,
        },
        annotations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constants() -> LatticeConstants {
        LatticeConstants::new(4.0, 0.0, 5.0)
    }

    #[test]
    fn test_empty_sites() {
        let p = project(&[], &constants(), 8.0).unwrap();

        assert!(p.atom_positions.is_empty());
        assert_eq!(p.bounds, Bounds { x_min: 0.0, y_min: 0.0 });
        assert!(p.annotations.iter().all(|a| a.is_degenerate()));
    }

    #[test]
    fn test_single_site() {
        let sites = [LatticeSite::new(-2.0, -3.0)];
        let p = project(&sites, &constants(), 8.0).unwrap();

        assert_eq!(p.atom_positions, vec![Point::new(-16.0, -24.0)]);
        assert_eq!(p.bounds.x_min, -16.0);
        assert_eq!(p.bounds.y_min, -24.0);

        let a = p.annotations.a_arrow;
        assert_eq!(a.tail, Point::new(-16.0, 40.0));
        assert_eq!(a.tip, Point::new(16.0, 40.0));
        assert_eq!(a.length(), 32.0);

        let b = p.annotations.b_arrow;
        assert_eq!(b.tail, Point::new(-16.0, 0.0));
        assert_eq!(b.tip, Point::new(-16.0, 40.0));

        let d = p.annotations.d_arrow;
        assert_eq!(d.tail, Point::new(-16.0, -24.0));
        assert_eq!(d.tip, Point::new(-16.0, 16.0));
        assert_eq!(d.length(), 40.0);
    }

    #[test]
    fn test_bounds_anchor_at_origin() {
        let sites = [LatticeSite::new(2.0, 3.0), LatticeSite::new(5.0, 1.0)];
        let p = project(&sites, &constants(), 8.0).unwrap();

        assert_eq!(p.bounds, Bounds { x_min: 0.0, y_min: 0.0 });
    }

    #[test]
    fn test_rejects_non_finite_site() {
        let sites = [
            LatticeSite::new(0.0, 0.0),
            LatticeSite::new(f64::NAN, 1.0),
        ];
        let err = project(&sites, &constants(), 8.0).unwrap_err();

        assert!(matches!(err, XrayError::InvalidCoordinate { index: 1, .. }));
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(LatticeProjector::new(0.0).is_err());
        assert!(LatticeProjector::new(f64::INFINITY).is_err());
        assert!(project(&[], &constants(), -1.0).is_err());
    }

    #[test]
    fn test_label_anchors() {
        let sites = [LatticeSite::new(-2.0, -3.0)];
        let p = LatticeProjector::default()
            .project(&sites, &constants())
            .unwrap();

        let (pos, align) = p.annotations.a_arrow.label_anchor();
        assert_eq!(align, LabelAlign::TopCenter);
        assert_eq!(pos, Point::new(0.0, 40.0));

        let (pos, align) = p.annotations.b_arrow.label_anchor();
        assert_eq!(align, LabelAlign::RightMiddle);
        assert_eq!(pos, Point::new(-21.0, 20.0));
        assert_eq!(p.annotations.d_arrow.kind.label(), "d");
    }

    #[test]
    fn test_project_is_idempotent() {
        let sites = crate::models::generate_sites(&constants(), 5, 3);
        let first = project(&sites, &constants(), 8.0).unwrap();
        let second = project(&sites, &constants(), 8.0).unwrap();

        assert_eq!(first, second);
    }
}
