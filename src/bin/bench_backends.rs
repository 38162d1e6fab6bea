use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jacobi_relax::{Backend, EquationKind, Grid, RelaxError, Solver, SolverConfig};

const EPSILON: f64 = 1e-12;

/// 各バックエンドで同じ問題を解き、実行時間と結果の一致を確認する
#[derive(Parser, Debug)]
#[command(name = "bench_backends", about)]
struct Args {
    #[arg(short = 'n', long, default_value_t = 500)]
    size: usize,

    #[arg(short = 'i', long, default_value_t = 100)]
    max_iterations: usize,

    /// 行ブロック数 (Rayon のスレッド数にも使う)
    #[arg(short, long, default_value_t = 2)]
    workers: usize,

    #[arg(short, long, default_value = "laplace")]
    equation: EquationKind,

    /// 測定回数
    #[arg(long, default_value_t = 15)]
    runs: usize,

    /// ウォームアップ回数
    #[arg(long, default_value_t = 3)]
    warmup: usize,
}

fn run_benchmark(
    name: &str,
    runs: usize,
    warmup: usize,
    mut bench_fn: impl FnMut() -> Result<(Duration, Grid), RelaxError>,
) -> Result<Grid, RelaxError> {
    println!("{}:", name);

    // ウォームアップ
    for _ in 0..warmup {
        bench_fn()?;
        thread::sleep(Duration::from_millis(100));
    }

    // 本番計測
    let mut times = Vec::with_capacity(runs);
    let mut last = None;
    for i in 0..runs {
        let (duration, grid) = bench_fn()?;
        times.push(duration);
        last = Some(grid);
        println!("  試行 {:2}: {:?}", i + 1, duration);
        thread::sleep(Duration::from_millis(50));
    }

    // 統計計算
    times.sort();
    let median = times[runs / 2];
    let avg = times.iter().sum::<Duration>() / runs as u32;
    println!("  ---");
    println!("  最小値:   {:?}", times[0]);
    println!("  中央値:   {:?}", median);
    println!("  平均値:   {:?}", avg);
    println!("  最大値:   {:?}", times[runs - 1]);
    println!();

    last.ok_or_else(|| RelaxError::Config("no runs were measured".to_string()))
}

/// 格子の全要素が一致するかチェック
fn grids_are_equal(a: &Grid, b: &Grid) -> bool {
    a.side() == b.side() && a.data().iter().zip(b.data()).all(|(x, y)| (x - y).abs() <= EPSILON)
}

/// single の結果と比べ、一致しなければ `Mismatch`
fn check_agreement(reference: &Grid, backend: Backend, grid: &Grid) -> Result<(), RelaxError> {
    if grids_are_equal(reference, grid) {
        Ok(())
    } else {
        Err(RelaxError::Mismatch(format!("{backend} differs from single")))
    }
}

fn run(args: &Args) -> Result<(), RelaxError> {
    if args.runs == 0 {
        return Err(RelaxError::Config("runs must be positive".to_string()));
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers)
        .build_global()
        .map_err(|e| RelaxError::Config(e.to_string()))?;

    println!("=== Jacobi 緩和 バックエンド比較 ===");
    println!(
        "n: {}, 反復上限: {}, 方程式: {}, 測定回数: {}, ブロック数: {}\n",
        args.size, args.max_iterations, args.equation, args.runs, args.workers
    );

    let mut reference: Option<Grid> = None;
    let mut mismatched = Vec::new();
    for backend in Backend::ALL {
        // 許容誤差を極小にして毎回上限まで回す
        let config = SolverConfig::new(args.size, f64::MIN_POSITIVE)
            .with_max_iterations(args.max_iterations)
            .with_workers(args.workers)
            .with_backend(backend);
        let solver = Solver::new(config);

        let grid = run_benchmark(&backend.to_string(), args.runs, args.warmup, || {
            let report = solver.solve(args.equation)?;
            Ok((report.elapsed, report.grid))
        })?;

        if let Some(expected) = &reference {
            match check_agreement(expected, backend, &grid) {
                Ok(()) => println!("  ✓ {} は single と一致\n", backend),
                Err(e) => {
                    eprintln!("  ✗ {} の結果が single と一致しません\n", backend);
                    mismatched.push(e.to_string());
                }
            }
        } else {
            reference = Some(grid);
        }
    }

    println!("=== ベンチマーク完了 ===");
    if !mismatched.is_empty() {
        return Err(RelaxError::Mismatch(mismatched.join(", ")));
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .init();

    let args = Args::parse();
    if args.workers == 0 {
        eprintln!("エラー: ブロック数は1以上である必要があります");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("エラー: {e}");
            ExitCode::FAILURE
        }
    }
}
