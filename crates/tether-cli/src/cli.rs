//! tetherd - keeps one database session alive and polls a statement on it
//!
//! Exit status: 0 on a clean stop, 1 when configuration or bootstrap fails,
//! 2 when the connection could not be recovered within the retry ceiling.

mod config;
mod logging;
mod worker;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tether_connection::{ConnectionManager, ConsoleSink, FatalError, ResilientInvoker};
use tether_driver_mysql::MySqlDriver;

use crate::config::DaemonConfig;
use crate::worker::PollWorker;

const EXIT_BOOTSTRAP: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "tetherd", version, about = "Self-healing single-connection database worker")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "tetherd.toml")]
    config: PathBuf,

    /// Run the statement once and exit
    #[arg(long)]
    once: bool,

    /// Log filter directives, overriding RUST_LOG and the config file
    #[arg(long)]
    log_filter: Option<String>,

    /// Database password, overriding the config file
    #[arg(long, env = "TETHER_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<FatalError>() {
            Some(fatal) => {
                tracing::error!(error = %fatal, "giving up on the database connection");
                ExitCode::from(EXIT_FATAL)
            }
            None => {
                eprintln!("tetherd: {:#}", err);
                ExitCode::from(EXIT_BOOTSTRAP)
            }
        },
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = DaemonConfig::load(&args.config)?;
    let _log_guard = logging::init(&config.logging, args.log_filter.as_deref())
        .context("failed to initialize logging")?;

    let connection = config.connection.resolve(args.password.as_deref())?;
    let params = config.worker.bound_params()?;
    tracing::info!(
        target_db = %connection.target(),
        max_retries = config.reconnect_config().max_retries(),
        interval_secs = config.worker.interval_secs,
        "starting tetherd"
    );

    let manager = Arc::new(ConnectionManager::new(
        MySqlDriver::new(),
        connection,
        config.reconnect_config(),
    ));
    let invoker = ResilientInvoker::establish(manager, Arc::new(ConsoleSink)).await?;

    let worker = PollWorker::new(
        Arc::new(invoker),
        config.worker.statement.clone(),
        params,
        config.worker.interval(),
    );
    worker.run(args.once.then_some(1)).await?;
    Ok(())
}
