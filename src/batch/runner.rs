//! # 并行执行器
//!
//! 在独立的 rayon 线程池上并行执行纯函数任务，结果保持输入顺序。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代
//! - 进度条显示
//!
//! ## 依赖关系
//! - 被 `xrd/sweep.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{Result, XrayError};
use crate::utils::progress;

use rayon::prelude::*;

/// 并行执行器
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的执行器，`jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行映射，结果顺序与输入一致
    pub fn map<T, R, F>(&self, items: &[T], message: &str, f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        let pb = progress::create_progress_bar(items.len() as u64, message);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| XrayError::Other(format!("Failed to build thread pool: {}", e)))?;

        let results = pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let result = f(item);
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();
        Ok(results)
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_order() {
        let runner = BatchRunner::new(4);
        let items: Vec<u32> = (0..100).collect();
        let out = runner.map(&items, "square", |x| x * x).unwrap();

        assert_eq!(out.len(), 100);
        assert_eq!(out[7], 49);
        assert_eq!(out[99], 9801);
    }

    #[test]
    fn test_auto_jobs() {
        assert!(BatchRunner::new(0).jobs() >= 1);
        assert_eq!(BatchRunner::new(3).jobs(), 3);
    }
}
