//! # 模拟模型
//!
//! 持有 X 射线源的入射角、波长以及晶格。所有绑定共享同一个
//! `Dispatcher`，因此在 `reset` 等批量修改中派生量只重算一次。
//!
//! ## 依赖关系
//! - 被 `commands/replay.rs`, `commands/metrics.rs` 使用
//! - 使用 `reactive/` 和 `xrd/metrics.rs`

use crate::models::{Lattice, LatticeConstants};
use crate::reactive::{Dispatcher, Multilink, Observable, Subscription};
use crate::xrd::{DerivedMetrics, DiffractionMetrics};

use std::f64::consts::PI;

/// 模拟初始参数
#[derive(Debug, Clone, Copy)]
pub struct SimulationDefaults {
    /// 入射角（弧度）
    pub angle: f64,
    /// 波长
    pub wavelength: f64,
    pub constants: LatticeConstants,
    pub columns: usize,
    pub rows: usize,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            angle: PI / 6.0,
            wavelength: 8.0,
            constants: LatticeConstants::default(),
            columns: 7,
            rows: 4,
        }
    }
}

/// X 射线衍射模拟模型
pub struct XrayModel {
    /// 入射角（弧度）
    pub source_angle: Observable<f64>,
    /// 波长
    pub source_wavelength: Observable<f64>,
    pub lattice: Lattice,
    defaults: SimulationDefaults,
    dispatcher: Dispatcher,
}

impl XrayModel {
    pub fn new(defaults: SimulationDefaults) -> Self {
        Self {
            source_angle: Observable::new(defaults.angle),
            source_wavelength: Observable::new(defaults.wavelength),
            lattice: Lattice::new(defaults.constants, defaults.columns, defaults.rows),
            defaults,
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// 以当前值计算派生量
    pub fn metrics(&self) -> DerivedMetrics {
        DiffractionMetrics::compute(
            self.source_angle.get(),
            &self.lattice.constants.get(),
            self.source_wavelength.get(),
        )
    }

    /// 绑定派生量：三个输入任一变化时重算并回调
    pub fn link_metrics(&self, on_update: impl Fn(&DerivedMetrics) + 'static) -> Multilink {
        let angle = self.source_angle.clone();
        let constants = self.lattice.constants.clone();
        let wavelength = self.source_wavelength.clone();

        Multilink::builder(&self.dispatcher)
            .source(&self.source_angle)
            .source(&self.lattice.constants)
            .source(&self.source_wavelength)
            .build(move || {
                let metrics =
                    DiffractionMetrics::compute(angle.get(), &constants.get(), wavelength.get());
                on_update(&metrics);
            })
    }

    /// 监听晶格常数变化（用于重新投影）
    pub fn on_lattice_change(
        &self,
        callback: impl Fn(&LatticeConstants) + 'static,
    ) -> Subscription {
        self.lattice.constants.subscribe(callback)
    }

    /// 恢复初始参数
    pub fn reset(&self) {
        self.dispatcher.batch(|| {
            self.source_angle.set(self.defaults.angle);
            self.source_wavelength.set(self.defaults.wavelength);
            self.lattice.constants.set(self.defaults.constants);
        });
    }
}

impl Default for XrayModel {
    fn default() -> Self {
        Self::new(SimulationDefaults::default())
    }
}
