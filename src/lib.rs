//! 正方格子上のスカラー場を Jacobi 反復で緩和する。
//!
//! Laplace・熱伝導・波動の3種類のステンシルを、共通の
//! 「並列更新 → 完了待ち → 残差判定 → バッファ入れ替え」ループで解く。
//!
//! ```no_run
//! use jacobi_relax::{solve, EquationKind};
//!
//! let report = solve(100, 1e-4, EquationKind::Laplace)?;
//! println!("{:?} after {} iterations", report.termination, report.iterations);
//! # Ok::<(), jacobi_relax::RelaxError>(())
//! ```

pub mod config;
pub mod equation;
pub mod error;
pub mod grid;
pub mod implementations;
pub mod partition;
pub mod solver;

pub use config::SolverConfig;
pub use equation::{EquationKind, HeatRule};
pub use error::{RelaxError, Result};
pub use grid::Grid;
pub use implementations::Backend;
pub use solver::{solve, SolveReport, Solver, Termination};
