//! 反復緩和エンジン
//!
//! 1反復の流れ:
//! 1. `next` の内部行をブロックに分割 (`split_jobs`)
//! 2. バックエンドが各ブロックを並列に更新し、全完了を待つ
//! 3. 行ごとの残差を行順に合計 (ワーカー数に依存しない)
//! 4. バッファを入れ替え、収束または上限で終了
//!
//! Wave は3レベル (`prev`, `current`, `next`) を回す。それ以外は2レベル。

use std::mem;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::SolverConfig;
use crate::equation::{EquationKind, Stencil};
use crate::error::Result;
use crate::grid::Grid;
use crate::partition::{partition_rows, split_jobs};

/// 終了状態
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// diff / n² < tolerance
    Converged,
    /// 収束前に反復上限に達した
    MaxIterationsReached,
}

/// 反復中の状態。solve のたびに作り直す
#[derive(Clone, Copy, Debug, Default)]
struct IterationState {
    iteration: usize,
    residual: f64,
    termination: Option<Termination>,
}

#[derive(Clone, Debug)]
pub struct SolveReport {
    pub equation: EquationKind,
    /// 最後に計算された値を持つ格子
    pub grid: Grid,
    pub iterations: usize,
    /// 最終反復の diff / n²
    pub residual: f64,
    pub termination: Termination,
    /// 反復ごとの diff / n²
    pub residual_history: Vec<f64>,
    pub elapsed: Duration,
}

impl SolveReport {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve(&self, equation: EquationKind) -> Result<SolveReport> {
        // 確保の前に検証
        self.config.validate()?;

        let config = &self.config;
        let n = config.grid_size;
        let start = Instant::now();

        let mut current = Grid::new(n)?;
        current.set_boundary();
        // 境界はカーネルが書かないので、最初に複製すれば以後そのまま
        let mut next = current.clone();
        // 初速度 0 として prev = current から始める
        let mut prev = equation.needs_previous_level().then(|| current.clone());

        let blocks = partition_rows(n, config.workers);
        let mut row_residuals = vec![0.0; n];
        let mut history = Vec::with_capacity(config.max_iterations.min(1024));
        let mut state = IterationState::default();
        let scale = (n * n) as f64;

        info!(
            %equation,
            n,
            tolerance = config.tolerance,
            max_iterations = config.max_iterations,
            blocks = blocks.len(),
            backend = %config.backend,
            "starting relaxation"
        );

        while state.termination.is_none() {
            state.iteration += 1;

            {
                let stencil = Stencil::new(
                    equation,
                    config.heat_rule,
                    &current,
                    prev.as_ref().unwrap_or(&current),
                );
                let jobs = split_jobs(&blocks, &mut next, &mut row_residuals);
                let done = config.backend.sweep(&stencil, jobs);
                debug_assert_eq!(done.iter().map(|b| b.len()).sum::<usize>(), n);
            }

            // 全ワーカー完了後に行順で合計
            let diff: f64 = row_residuals.iter().sum();
            state.residual = diff / scale;
            history.push(state.residual);

            // prev <- current <- next (next には不要になった古いバッファが戻る)
            if let Some(prev) = prev.as_mut() {
                mem::swap(prev, &mut current);
            }
            mem::swap(&mut current, &mut next);

            debug!(iteration = state.iteration, residual = state.residual, "iteration finished");

            if state.residual < config.tolerance {
                state.termination = Some(Termination::Converged);
            } else if state.iteration >= config.max_iterations {
                state.termination = Some(Termination::MaxIterationsReached);
            }
        }

        let termination = state.termination.unwrap_or(Termination::MaxIterationsReached);
        let elapsed = start.elapsed();
        match termination {
            Termination::Converged => info!(
                %equation,
                iterations = state.iteration,
                residual = state.residual,
                ?elapsed,
                "converged"
            ),
            Termination::MaxIterationsReached => warn!(
                %equation,
                iterations = state.iteration,
                residual = state.residual,
                ?elapsed,
                "iteration cap reached before convergence"
            ),
        }

        Ok(SolveReport {
            equation,
            grid: current,
            iterations: state.iteration,
            residual: state.residual,
            termination,
            residual_history: history,
            elapsed,
        })
    }
}

/// 既定設定 (反復上限 100、並列度は利用可能なコア数) で解く
pub fn solve(n: usize, tolerance: f64, equation: EquationKind) -> Result<SolveReport> {
    Solver::new(SolverConfig::new(n, tolerance)).solve(equation)
}
