use clap::Parser;
use deposito_engine::{
    config::Config,
    output,
    run::{run, RunError},
};
use std::fs::File;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(&config.log_level);

    match execute(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "batch failed");
            ExitCode::FAILURE
        }
    }
}

// Logs go to stderr, stdout may be carrying the transactions CSV.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn execute(config: &Config) -> Result<(), RunError> {
    let snapshot = File::open(&config.snapshot)?;
    let transactions = File::open(&config.transactions)?;
    let output_stream: Box<dyn io::Write> = match &config.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    let summary = run(snapshot, transactions, output_stream, &config.options())?;

    if let Some(path) = &config.balances {
        output::write_balances(File::create(path)?, &summary.accounts)?;
        tracing::info!(accounts = summary.accounts.len(), path = %path.display(), "wrote balances");
    }

    Ok(())
}
