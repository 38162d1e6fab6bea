//! ソルバ設定
//!
//! 既定値は `grid` の定数に合わせる。TOML ファイルから読む場合、書かれていない
//! 項目は既定値になる。
//!
//! ```toml
//! grid_size = 200
//! tolerance = 1e-5
//! max_iterations = 5000
//! workers = 8
//! backend = "channel"
//! heat_rule = "half-center-damping"
//! ```

use std::fs;
use std::path::Path;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::equation::HeatRule;
use crate::error::{RelaxError, Result};
use crate::grid::{cell_count, MAX_ITERATIONS, N, TOLERANCE};
use crate::implementations::Backend;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// 内部セル数 n (格子は (n+2)×(n+2))
    pub grid_size: usize,
    /// diff / n² がこれを下回ったら収束
    pub tolerance: f64,
    /// 反復回数の上限
    pub max_iterations: usize,
    /// 行ブロック数 (分割の粒度)。n より大きい場合は n に切り詰める
    pub workers: usize,
    pub backend: Backend,
    pub heat_rule: HeatRule,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            grid_size: N,
            tolerance: TOLERANCE,
            max_iterations: MAX_ITERATIONS,
            workers: default_workers(),
            backend: Backend::default(),
            heat_rule: HeatRule::default(),
        }
    }
}

/// 利用可能な並列度。取得できなければ 1
pub fn default_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

impl SolverConfig {
    pub fn new(grid_size: usize, tolerance: f64) -> Self {
        Self {
            grid_size,
            tolerance,
            ..Self::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_heat_rule(mut self, heat_rule: HeatRule) -> Self {
        self.heat_rule = heat_rule;
        self
    }

    /// 格子を確保する前に呼ぶ
    pub fn validate(&self) -> Result<()> {
        // (n+2)² が確保可能か。行残差の n 要素もこれで収まる
        cell_count(self.grid_size)?;
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RelaxError::InvalidSize(format!(
                "tolerance must be a positive finite number, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(RelaxError::InvalidSize("max_iterations must be positive".to_string()));
        }
        if self.workers == 0 {
            return Err(RelaxError::InvalidSize("workers must be positive".to_string()));
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SolverConfig = toml::from_str(text)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_driver_constants() {
        let config = SolverConfig::default();
        assert_eq!(config.grid_size, 1000);
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.max_iterations, 100);
        assert!(config.workers >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_positive_inputs() {
        for config in [
            SolverConfig::new(0, 1e-4),
            SolverConfig::new((1usize << 32) - 2, 1e-4),
            SolverConfig::new(10, 0.0),
            SolverConfig::new(10, -1.0),
            SolverConfig::new(10, f64::NAN),
            SolverConfig::new(10, 1e-4).with_max_iterations(0),
            SolverConfig::new(10, 1e-4).with_workers(0),
        ] {
            assert!(matches!(config.validate(), Err(RelaxError::InvalidSize(_))), "{config:?}");
        }
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = SolverConfig::from_toml_str(
            r#"
            grid_size = 64
            backend = "channel"
            heat_rule = "half-center-damping"
            "#,
        )
        .unwrap();

        assert_eq!(config.grid_size, 64);
        assert_eq!(config.backend, Backend::Channel);
        assert_eq!(config.heat_rule, HeatRule::HalfCenterDamping);
        assert_eq!(config.tolerance, TOLERANCE);
        assert_eq!(config.max_iterations, MAX_ITERATIONS);
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = SolverConfig::from_toml_str("grid = 3").unwrap_err();
        assert!(matches!(err, RelaxError::Config(_)));
    }
}
