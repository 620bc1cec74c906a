//! # metrics 子命令实现
//!
//! 对一组输入计算面板派生量并打印。
//!
//! ## 依赖关系
//! - 使用 `cli/metrics.rs` 定义的 MetricsArgs
//! - 使用 `xrd/metrics.rs`, `xrd/panel.rs`, `xrd/sweep.rs`

use crate::cli::metrics::MetricsArgs;
use crate::error::Result;
use crate::utils::{output, parse};
use crate::xrd::sweep::{bragg_orders, match_order, BraggOrder};
use crate::xrd::{DiffractionMetrics, ParameterPanel};

use std::f64::consts::FRAC_PI_2;

/// 判定 2d sin(θ) = nλ 时比值与整数的最大偏差
const EXACT_TOLERANCE: f64 = 1e-6;

/// 执行 metrics 命令
pub fn execute(args: MetricsArgs) -> Result<()> {
    output::print_header("Bragg Diffraction Metrics");

    let constants = parse::parse_constants(&args.source.lattice)?;
    let wavelength = parse::parse_wavelength(&args.source.wavelength)?;
    let angle = if args.radians {
        args.source.angle
    } else {
        args.source.angle.to_radians()
    };

    if !(0.0..=FRAC_PI_2).contains(&angle) {
        output::print_warning(&format!(
            "Incident angle {:.3} rad is outside the expected range [0, π/2]",
            angle
        ));
    }

    let metrics = DiffractionMetrics::compute(angle, &constants, wavelength);
    let mut panel = ParameterPanel::default();
    panel.apply(&metrics);

    for line in panel.lines() {
        println!("  {}", line);
    }
    println!();

    match metrics.path_diff_over_lambda.to_result() {
        Err(e) => output::print_warning(&e.to_string()),
        Ok(_) => {
            if let Some(n) = exact_order(angle, constants.z, wavelength) {
                output::print_success(&format!("Bragg condition satisfied: 2d sin(θ) = {}λ", n));
            }
        }
    }

    if args.orders {
        match bragg_orders(constants.z, wavelength) {
            Ok(orders) => print_order_table(&orders),
            Err(e) => output::print_warning(&e.to_string()),
        }
    }

    Ok(())
}

/// 未取整比值恰为正整数时返回该级次
fn exact_order(angle: f64, d: f64, wavelength: f64) -> Option<u32> {
    DiffractionMetrics::ratio(angle, d, wavelength)
        .value()
        .and_then(|r| match_order(r, EXACT_TOLERANCE))
}

/// 打印 Bragg 级次表
pub(crate) fn print_order_table(orders: &[BraggOrder]) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct OrderRow {
        #[tabled(rename = "n")]
        n: u32,
        #[tabled(rename = "θ (°)")]
        theta: String,
        #[tabled(rename = "2θ (°)")]
        two_theta: String,
    }

    if orders.is_empty() {
        output::print_info("No Bragg reflection possible (λ > 2d)");
        return;
    }

    let rows: Vec<OrderRow> = orders
        .iter()
        .map(|o| OrderRow {
            n: o.n,
            theta: format!("{:.3}", o.theta_deg),
            two_theta: format!("{:.3}", 2.0 * o.theta_deg),
        })
        .collect();

    output::print_header(&format!("Bragg Orders ({})", rows.len()));
    println!("{}", Table::new(&rows));
}
