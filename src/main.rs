// Command-line entry point for tryhard.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tryhard::application::{RunReport, TryhardUsecase};
use tryhard::infrastructure::concurrency::init_thread_pool;
use tryhard::infrastructure::config_loader::{FileConfig, Overrides, Settings};
use tryhard::infrastructure::source_walker::collect_go_files;
use tryhard::infrastructure::{BackupWriter, SplicePrinter, TreeSitterGoParser};
use tryhard::ports::report_exporter::ReportExporter;

/// Lists and rewrites Go error checks that could use `try`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Files or directories to process
    paths: Vec<PathBuf>,

    /// List positions of potential `try` candidate statements
    #[arg(short = 'l')]
    list: bool,

    /// Rewrite potential `try` candidate statements to use `try`
    #[arg(short = 'r')]
    rewrite: bool,

    /// Name of the error variable; "" permits any name
    #[arg(long, value_name = "NAME")]
    err: Option<String>,

    /// Result type that marks a function as returning an error
    #[arg(long, value_name = "NAME")]
    error_type: Option<String>,

    /// Ignore files with paths matching this regex ("" ignores nothing) [default: vendor]
    #[arg(long, value_name = "REGEX")]
    ignore: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Number of worker threads (default: one per CPU)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// TOML file with `err`, `ignore` and `error_type` defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    // TRYHARD_LOG wins over RUST_LOG; default to WARN
    let filter = EnvFilter::try_from_env("TRYHARD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_report(report: &RunReport, cli: &Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        ReportExporter::write_json(report, cli.list, &mut out)?;
    } else {
        ReportExporter::write_text(report, cli.list, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let file_config = match &cli.config {
        Some(path) => match FileConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {:#}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(
        Overrides {
            err: cli.err.clone(),
            ignore: cli.ignore.clone(),
            error_type: cli.error_type.clone(),
        },
        file_config,
    );
    let ignore = match settings.ignore_regex() {
        Ok(rx) => rx,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(2);
        }
    };
    let config = settings.config(cli.list, cli.rewrite);

    if let Err(e) = init_thread_pool(cli.jobs) {
        warn!("[tryhard] Using the default thread pool: {}", e);
    }

    let collected = collect_go_files(&cli.paths, ignore.as_ref());

    let usecase = TryhardUsecase {
        parser: &TreeSitterGoParser,
        printer: &SplicePrinter,
        writer: &BackupWriter,
        config: &config,
    };
    let mut report = usecase.run(&collected.files);

    let mut errors = collected.errors;
    errors.extend(report.errors.drain(..).map(|e| (e.path, e.error)));
    for (path, error) in &errors {
        eprintln!("{}: {:#}", path.display(), error);
    }

    if report.files > 0 {
        if let Err(e) = print_report(&report, &cli) {
            eprintln!("{:#}", e);
            return ExitCode::from(2);
        }
    }

    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}
