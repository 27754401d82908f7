use anyhow::{Context, Result};
use clap::Parser;
use dbgrush::{run_dbgrush, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG overrides the level picked by --verbose
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let report = run_dbgrush(&args)
        .with_context(|| format!("assembly of {} failed", args.reads.display()))?;
    print!("{}", report);
    Ok(())
}
