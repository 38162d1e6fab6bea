use jacobi_relax::{solve, EquationKind, Grid, RelaxError, Solver, SolverConfig, Termination};

const EPSILON: f64 = 1e-12;

/// 境界値が初期化時のままかチェック
fn assert_boundary_intact(grid: &Grid, label: &str) {
    let n = grid.n();

    // 左右の列 (i=1..=n) は 1.0
    for i in 1..=n {
        assert_eq!(grid.at(i, 0).unwrap(), 1.0, "{label}: left boundary at ({i}, 0)");
        assert_eq!(grid.at(i, n + 1).unwrap(), 1.0, "{label}: right boundary at ({i}, {})", n + 1);
    }

    // 上下の行は四隅も含めて 0.0
    for j in 0..n + 2 {
        assert_eq!(grid.at(0, j).unwrap(), 0.0, "{label}: top boundary at (0, {j})");
        assert_eq!(grid.at(n + 1, j).unwrap(), 0.0, "{label}: bottom boundary at ({}, {j})", n + 1);
    }
}

#[test]
fn test_boundary_conditions_every_iteration() {
    for equation in EquationKind::ALL {
        for steps in 1..=6 {
            let config = SolverConfig::new(12, 1e-12).with_max_iterations(steps);
            let report = Solver::new(config).solve(equation).unwrap();
            assert_boundary_intact(&report.grid, &format!("{equation} after {steps} iterations"));
        }
    }
}

#[test]
fn test_terminates_within_cap() {
    for equation in EquationKind::ALL {
        let config = SolverConfig::new(30, 1e-4).with_max_iterations(40);
        let report = Solver::new(config).solve(equation).unwrap();

        assert!(report.iterations >= 1 && report.iterations <= 40);
        assert_eq!(report.residual_history.len(), report.iterations);
        if report.termination == Termination::MaxIterationsReached {
            assert_eq!(report.iterations, 40);
        } else {
            assert!(report.residual < 1e-4);
        }
    }
}

#[test]
fn test_single_cell_laplace() {
    // 4近傍すべてが境界: 0.25 * (1 + 1 + 0 + 0)
    let report = solve(1, 1e-4, EquationKind::Laplace).unwrap();

    assert_eq!(report.termination, Termination::Converged);
    assert!(report.iterations <= 3);
    assert_eq!(report.grid.at(1, 1).unwrap(), 0.5);
}

#[test]
fn test_small_laplace_is_bounded_and_symmetric() {
    let n = 4;
    let config = SolverConfig::new(n, 1e-3).with_max_iterations(1000);
    let report = Solver::new(config).solve(EquationKind::Laplace).unwrap();
    assert!(report.converged());

    let grid = &report.grid;
    assert!(grid.interior_values().all(|v| v > 0.0 && v < 1.0));

    // 上下の境界が同じなので行を反転しても同じ
    for i in 1..=n {
        for j in 1..=n {
            let a = grid.at(i, j).unwrap();
            let b = grid.at(n + 1 - i, j).unwrap();
            assert!((a - b).abs() < EPSILON, "({i}, {j}): {a} vs {b}");
        }
    }
}

#[test]
fn test_laplace_residual_is_non_increasing() {
    let config = SolverConfig::new(16, 1e-6).with_max_iterations(5000);
    let report = Solver::new(config).solve(EquationKind::Laplace).unwrap();
    assert!(report.converged());

    for pair in report.residual_history.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-15, "residual grew: {} -> {}", pair[0], pair[1]);
    }
}

#[test]
fn test_wave_uses_three_time_levels() {
    // 1セル: 0.25 -> 0.75 -> 1.5 (prev を正しく2レベル前から取る場合)
    let expected = [0.25, 0.75, 1.5];
    for (steps, value) in (1..=3).zip(expected) {
        let config = SolverConfig::new(1, 1e-4).with_max_iterations(steps);
        let report = Solver::new(config).solve(EquationKind::Wave).unwrap();

        assert_eq!(report.termination, Termination::MaxIterationsReached);
        assert_eq!(report.grid.at(1, 1).unwrap(), value, "after {steps} iterations");
    }
}

#[test]
fn test_invalid_input_is_rejected() {
    assert!(matches!(solve(0, 1e-4, EquationKind::Laplace), Err(RelaxError::InvalidSize(_))));
    assert!(matches!(solve(100, 0.0, EquationKind::Laplace), Err(RelaxError::InvalidSize(_))));
    assert!(matches!(solve(100, -1e-4, EquationKind::Heat), Err(RelaxError::InvalidSize(_))));
    // (n+2)² が usize に収まらない大きさも、確保の前に InvalidSize になる
    assert!(matches!(
        solve((1usize << 32) - 2, 1e-4, EquationKind::Laplace),
        Err(RelaxError::InvalidSize(_))
    ));
}
