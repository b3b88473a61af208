use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use simple_resigner::{DEFAULT_CONFIG_PATH, RunConfig, RunReport, run};
use tracing_subscriber::EnvFilter;

/// Recompute the signature of a tampered message and splice it back in.
#[derive(Parser)]
#[clap(name = "resign", version)]
struct Args {
    /// Message file to re-sign in place.
    message: PathBuf,
    /// Signing directive file.
    #[clap(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Directory for the staged copy of the rewritten message.
    #[clap(long, env = "RESIGN_STAGING_DIR")]
    staging_dir: Option<PathBuf>,
    /// Print the new signature without rewriting the message.
    #[clap(long, env = "RESIGN_DRY_RUN")]
    dry_run: bool,
    /// Print the run report as JSON.
    #[clap(long)]
    json: bool,
    #[clap(long, env = "RESIGN_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut run_config = RunConfig::new(args.message)
        .with_config_path(args.config)
        .with_dry_run(args.dry_run);
    if let Some(dir) = args.staging_dir {
        run_config = run_config.with_staging_dir(dir);
    }

    match run(&run_config) {
        Ok(report) => {
            print_report(&report, args.json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(stage = err.stage(), "{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn print_report(report: &RunReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::warn!("could not serialize report: {e}"),
        }
    } else if let Err(e) = write_search_and_replace(report) {
        tracing::warn!("could not write search and replace strings: {e}");
    }
}

// Raw bytes, so a proxy reading stdout gets exactly what was spliced.
fn write_search_and_replace(report: &RunReport) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(&report.signed.search_bytes())?;
    stdout.write_all(b"\n")?;
    stdout.write_all(&report.signed.replace_bytes())?;
    stdout.write_all(b"\n")?;
    stdout.flush()
}
