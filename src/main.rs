//! line-balance CLI
//!
//! # Commands
//!
//! - `report`: Load a wide roster, balance it, and write every report
//! - `generate`: Write a seeded synthetic roster
//!
//! Settings come from an optional TOML file; flags and `LINE_BALANCE_*`
//! environment variables override it. Logs go to stderr (`RUST_LOG`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use line_balance::balancing::Balancer;
use line_balance::config::AppConfig;
use line_balance::export::write_run;
use line_balance::generator::{GeneratorConfig, RosterGenerator};
use line_balance::ingest::load_roster_csv;
use line_balance::models::AllocationStore;
use line_balance::report::RunReport;

/// Course/line enrolment balancing
#[derive(Parser)]
#[command(name = "line-balance")]
#[command(version)]
#[command(about = "Report and rebalance course headcounts across timetable lines")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Balance a roster and write the reports
    Report(ReportArgs),
    /// Write a synthetic roster
    Generate(GenerateArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Wide roster CSV
    #[arg(short, long, env = "LINE_BALANCE_INPUT")]
    input: PathBuf,

    /// Directory for report files
    #[arg(short, long, env = "LINE_BALANCE_OUTDIR", default_value = "reports")]
    outdir: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "LINE_BALANCE_CONFIG")]
    config: Option<PathBuf>,

    /// Round cap
    #[arg(long, env = "LINE_BALANCE_MAX_ROUNDS")]
    max_rounds: Option<usize>,

    /// Relocation steps allowed per student
    #[arg(long, env = "LINE_BALANCE_MAX_MOVES")]
    max_moves: Option<usize>,

    /// Only move students into lines they have free
    #[arg(long, env = "LINE_BALANCE_NO_MULTI_HOP")]
    no_multi_hop: bool,

    /// Only balance the N most imbalanced courses
    #[arg(long, env = "LINE_BALANCE_TOP_ONLY")]
    top_only: Option<usize>,

    /// Minimum offering lines for the imbalance report
    #[arg(long, env = "LINE_BALANCE_MIN_LINES")]
    min_lines: Option<usize>,

    /// Flag courses whose spread after the run exceeds this
    #[arg(long, env = "LINE_BALANCE_ALERT_RANGE")]
    alert_range: Option<usize>,
}

impl ReportArgs {
    /// File settings overridden by flags.
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => AppConfig::default(),
        };
        if let Some(n) = self.max_rounds {
            config.balance.max_rounds = n;
        }
        if let Some(n) = self.max_moves {
            config.balance.max_moves_per_student = n;
        }
        if self.no_multi_hop {
            config.balance.multi_hop = false;
        }
        if let Some(n) = self.top_only {
            config.balance.top_only = Some(n);
        }
        if let Some(n) = self.min_lines {
            config.report.min_lines = n;
        }
        if let Some(n) = self.alert_range {
            config.report.alert_range = n;
        }
        Ok(config)
    }
}

#[derive(Args)]
struct GenerateArgs {
    /// Output CSV
    #[arg(short, long)]
    output: PathBuf,

    /// Number of students
    #[arg(long, default_value_t = 120)]
    students: usize,

    /// Number of lines
    #[arg(long, default_value_t = 6)]
    lines: usize,

    /// Number of courses
    #[arg(long, default_value_t = 18)]
    courses: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn run_report(args: ReportArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let records = load_roster_csv(&args.input, &config.roster)
        .with_context(|| format!("loading roster {}", args.input.display()))?;

    let outcome = Balancer::new(config.balance.clone()).run(AllocationStore::new(records));
    info!(
        moves = outcome.moves.len(),
        students = outcome.students_moved(),
        rounds = outcome.rounds,
        "run complete"
    );

    let report = RunReport::build(&outcome.before, &outcome.after, outcome.moves, &config.report);
    let written = write_run(&args.outdir, &outcome.before, &report, outcome.store.records())
        .with_context(|| format!("writing reports to {}", args.outdir.display()))?;

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = GeneratorConfig::default()
        .with_students(args.students)
        .with_lines(args.lines)
        .with_courses(args.courses)
        .with_seed(args.seed);
    RosterGenerator::new(config)
        .generate()
        .to_path(&args.output)
        .with_context(|| format!("writing roster {}", args.output.display()))?;
    println!("{}", args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Report(args) => run_report(args),
        Commands::Generate(args) => run_generate(args),
    }
}
