//! # 入射角扫描
//!
//! 在一段入射角范围内逐点计算程差与 2d·sin(θ)/λ，
//! 标记满足 Bragg 条件 (2d·sin θ = nλ) 的采样点，
//! 并给出各级衍射的解析角度 θn = asin(nλ / 2d)。
//!
//! ## 依赖关系
//! - 被 `commands/sweep.rs` 调用
//! - 使用 `xrd/metrics.rs` 计算程差
//! - 使用 `batch/runner.rs` 并行计算

use crate::batch::BatchRunner;
use crate::error::{Result, XrayError};
use crate::models::LatticeConstants;
use crate::xrd::metrics::DiffractionMetrics;

use serde::Serialize;

/// 默认整数级次匹配容差
pub const DEFAULT_TOLERANCE: f64 = 0.02;

/// 单次扫描的最大采样点数
pub const MAX_SAMPLES: usize = 10_000_000;

/// 扫描范围（度）
#[derive(Debug, Clone, Copy)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl SweepRange {
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(XrayError::InvalidRange(format!(
                "step must be positive, got {}",
                step
            )));
        }
        if !(0.0..=90.0).contains(&start) || !(0.0..=90.0).contains(&end) || end < start {
            return Err(XrayError::InvalidRange(format!(
                "{}-{} (must be 0 <= start <= end <= 90)",
                start, end
            )));
        }
        let range = Self { start, end, step };
        let count = range.intervals() + 1.0;
        if count > MAX_SAMPLES as f64 {
            return Err(XrayError::InvalidRange(format!(
                "{}-{} with step {} gives {:.0} samples (limit {})",
                start, end, step, count, MAX_SAMPLES
            )));
        }
        Ok(range)
    }

    fn intervals(&self) -> f64 {
        ((self.end - self.start) / self.step + 1e-9).floor()
    }

    /// 采样点数
    pub fn sample_count(&self) -> usize {
        self.intervals() as usize + 1
    }

    /// 含端点的角度网格
    pub fn angles(&self) -> Vec<f64> {
        let n = self.intervals() as usize;
        (0..=n)
            .map(|i| (self.start + i as f64 * self.step).min(self.end))
            .collect()
    }
}

/// 单个采样点
#[derive(Debug, Clone, Serialize)]
pub struct SweepSample {
    pub theta_deg: f64,
    pub path_diff: f64,
    /// 波长为 0 时为 None
    pub ratio: Option<f64>,
    /// 满足 Bragg 条件时的衍射级次
    pub order: Option<u32>,
}

/// 扫描结果
#[derive(Debug, Clone)]
pub struct AngleSweep {
    pub constants: LatticeConstants,
    pub wavelength: f64,
    pub samples: Vec<SweepSample>,
}

impl AngleSweep {
    /// 满足 Bragg 条件的采样点
    pub fn matches(&self) -> impl Iterator<Item = &SweepSample> + '_ {
        self.samples.iter().filter(|s| s.order.is_some())
    }
}

/// 解析衍射级次
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BraggOrder {
    pub n: u32,
    pub theta_deg: f64,
}

/// 在角度范围内扫描
pub fn sweep(
    constants: &LatticeConstants,
    wavelength: f64,
    range: &SweepRange,
    tolerance: f64,
    runner: &BatchRunner,
) -> Result<AngleSweep> {
    let angles = range.angles();
    let d = constants.z;

    let samples = runner.map(&angles, "Sweeping", |&theta_deg| {
        let theta = theta_deg.to_radians();
        let ratio = DiffractionMetrics::ratio(theta, d, wavelength).value();
        SweepSample {
            theta_deg,
            path_diff: DiffractionMetrics::path_difference(theta, d),
            ratio,
            order: ratio.and_then(|r| match_order(r, tolerance)),
        }
    })?;

    Ok(AngleSweep {
        constants: *constants,
        wavelength,
        samples,
    })
}

/// 比值接近正整数时返回该整数
pub(crate) fn match_order(ratio: f64, tolerance: f64) -> Option<u32> {
    let n = ratio.round();
    if n >= 1.0 && (ratio - n).abs() <= tolerance {
        Some(n as u32)
    } else {
        None
    }
}

/// 各级衍射角 θn = asin(nλ / 2d)
pub fn bragg_orders(d: f64, wavelength: f64) -> Result<Vec<BraggOrder>> {
    if !(wavelength.is_finite() && wavelength > 0.0) {
        return Err(XrayError::NotComputable {
            quantity: "Bragg angle",
            reason: format!("wavelength must be positive, got {}", wavelength),
        });
    }
    if !(d.is_finite() && d > 0.0) {
        return Err(XrayError::NotComputable {
            quantity: "Bragg angle",
            reason: format!("plane spacing d must be positive, got {}", d),
        });
    }

    let mut orders = Vec::new();
    let mut n = 1;
    loop {
        let sin_theta = n as f64 * wavelength / (2.0 * d);
        if sin_theta > 1.0 {
            break;
        }
        orders.push(BraggOrder {
            n,
            theta_deg: sin_theta.asin().to_degrees(),
        });
        n += 1;
    }
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_validation() {
        assert!(SweepRange::new(0.0, 90.0, 0.5).is_ok());
        assert!(SweepRange::new(10.0, 5.0, 0.5).is_err());
        assert!(SweepRange::new(0.0, 95.0, 0.5).is_err());
        assert!(SweepRange::new(0.0, 10.0, 0.0).is_err());
    }

    #[test]
    fn test_range_sample_limit() {
        let err = SweepRange::new(0.0, 90.0, 1e-12).unwrap_err();
        assert!(matches!(err, XrayError::InvalidRange(_)));

        // 90 / 8e-6 ≈ 11_250_000
        assert!(SweepRange::new(0.0, 90.0, 8e-6).is_err());

        let fine = SweepRange::new(0.0, 90.0, 1e-5).unwrap();
        assert!(fine.sample_count() >= 9_000_000 && fine.sample_count() <= MAX_SAMPLES);

        let coarse = SweepRange::new(0.0, 90.0, 0.5).unwrap();
        assert_eq!(coarse.sample_count(), coarse.angles().len());
        assert_eq!(coarse.sample_count(), 181);
    }

    #[test]
    fn test_angle_grid_inclusive() {
        let grid = SweepRange::new(0.0, 1.0, 0.25).unwrap().angles();
        assert_eq!(grid, vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let single = SweepRange::new(30.0, 30.0, 1.0).unwrap().angles();
        assert_eq!(single, vec![30.0]);
    }

    #[test]
    fn test_bragg_orders() {
        // λ = d: sin θn = n/2 -> 30°, 90°
        let orders = bragg_orders(2.0, 2.0).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].n, 1);
        assert!((orders[0].theta_deg - 30.0).abs() < 1e-9);
        assert!((orders[1].theta_deg - 90.0).abs() < 1e-9);

        assert!(bragg_orders(2.0, 0.0).is_err());
        assert!(bragg_orders(1.0, 5.0).unwrap().is_empty());
    }

    #[test]
    fn test_sweep_finds_first_order() {
        let c = LatticeConstants::new(4.0, 0.0, 5.0);
        let range = SweepRange::new(0.0, 90.0, 0.5).unwrap();
        let result = sweep(&c, 2.0, &range, DEFAULT_TOLERANCE, &BatchRunner::new(2)).unwrap();

        assert_eq!(result.samples.len(), 181);
        assert_eq!(result.samples[0].path_diff, 0.0);

        // θ1 = asin(0.2) ≈ 11.54°
        let first = result.matches().next().unwrap();
        assert_eq!(first.order, Some(1));
        assert!((first.theta_deg - 11.5).abs() < 0.01);

        // 2d sin(30°)/λ = 2.5，介于两级之间
        let at_30 = &result.samples[60];
        assert_eq!(at_30.theta_deg, 30.0);
        assert_eq!(at_30.order, None);

        let at_90 = result.samples.last().unwrap();
        assert_eq!(at_90.order, Some(5));
    }

    #[test]
    fn test_sweep_zero_wavelength() {
        let c = LatticeConstants::default();
        let range = SweepRange::new(10.0, 20.0, 5.0).unwrap();
        let result = sweep(&c, 0.0, &range, DEFAULT_TOLERANCE, &BatchRunner::new(1)).unwrap();

        assert!(result.samples.iter().all(|s| s.ratio.is_none()));
        assert_eq!(result.matches().count(), 0);
    }

    #[test]
    fn test_match_order() {
        assert_eq!(match_order(2.01, 0.02), Some(2));
        assert_eq!(match_order(1.95, 0.02), None);
        assert_eq!(match_order(0.01, 0.02), None);
    }
}
