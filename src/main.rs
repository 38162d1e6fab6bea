use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jacobi_relax::{Backend, EquationKind, HeatRule, RelaxError, SolveReport, Solver, SolverConfig};

/// Laplace / 熱伝導 / 波動方程式を並列 Jacobi 反復で解く
#[derive(Parser, Debug)]
#[command(name = "relax", version, about, long_about = None)]
struct Cli {
    /// 内部セル数 n (格子は (n+2)×(n+2))
    #[arg(short = 'n', long)]
    size: Option<usize>,

    /// 収束判定の許容誤差 (diff / n²)
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// 反復回数の上限
    #[arg(short = 'i', long)]
    max_iterations: Option<usize>,

    /// 行ブロック数 (既定: 利用可能なコア数)
    #[arg(short, long)]
    workers: Option<usize>,

    /// single | channel | rayon
    #[arg(short, long)]
    backend: Option<Backend>,

    /// average | half-center-damping
    #[arg(long)]
    heat_rule: Option<HeatRule>,

    /// 解く方程式 (複数指定可、既定は laplace, heat, wave の順)
    #[arg(short, long = "equation")]
    equations: Vec<EquationKind>,

    /// TOML 設定ファイル (コマンドライン引数が優先)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 最終格子を表示せず、要約だけを出す
    #[arg(long)]
    summary_only: bool,

    /// デバッグログを出す
    #[arg(short, long)]
    verbose: bool,

    /// エラー以外のログを抑制
    #[arg(short, long)]
    quiet: bool,
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(cli: &Cli) -> Result<SolverConfig, RelaxError> {
    let mut config = match &cli.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };

    if let Some(size) = cli.size {
        config.grid_size = size;
    }
    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
    }
    if let Some(max_iterations) = cli.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(heat_rule) = cli.heat_rule {
        config.heat_rule = heat_rule;
    }

    config.validate()?;
    Ok(config)
}

/// 1方程式分の結果を書き出す。`summary_only` でなければ最終格子も全て出す
fn write_report<W: Write>(out: &mut W, report: &SolveReport, summary_only: bool) -> io::Result<()> {
    let n = report.grid.n();
    let centre = (n + 1) / 2;
    writeln!(out, "  終了状態:   {:?}", report.termination)?;
    writeln!(out, "  反復回数:   {}", report.iterations)?;
    writeln!(out, "  残差:       {:.6e}", report.residual)?;
    writeln!(out, "  経過時間:   {:?}", report.elapsed)?;
    if let Ok(value) = report.grid.at(centre, centre) {
        writeln!(out, "  中心点 [{}][{}] = {:.6}", centre, centre, value)?;
    }
    if !summary_only {
        report.grid.write_to(out)?;
    }
    writeln!(out)
}

fn run(cli: &Cli) -> Result<(), RelaxError> {
    let config = build_config(cli)?;
    let equations = if cli.equations.is_empty() {
        EquationKind::ALL.to_vec()
    } else {
        cli.equations.clone()
    };

    println!("=== Jacobi 緩和ソルバ ===");
    println!(
        "n: {}, 許容誤差: {:e}, 反復上限: {}, ブロック数: {}, バックエンド: {}\n",
        config.grid_size, config.tolerance, config.max_iterations, config.workers, config.backend
    );

    let solver = Solver::new(config);
    for equation in equations {
        println!("{} を解いています...", equation);
        let report = solver.solve(equation)?;

        let stdout = io::stdout();
        let mut out = io::BufWriter::new(stdout.lock());
        write_report(&mut out, &report, cli.summary_only)?;
        out.flush()?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("エラー: {e}");
            ExitCode::FAILURE
        }
    }
}
