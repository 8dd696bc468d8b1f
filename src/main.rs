use clap::Parser;
use std::process::ExitCode;
use stock_recon::args::{Args, Command};
use stock_recon::{commands, Config, Result};
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    if let Err(e) = main_inner(args).await {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().stock_home().path();
    match args.command() {
        Command::Init => commands::init(home).await?.print(),
        Command::Ingest(a) => {
            let config = Config::load(home).await?;
            commands::ingest(config, a.clone()).await?.print()
        }
        Command::Reconcile(a) => {
            let config = Config::load(home).await?;
            commands::reconcile(config, a.clone()).await?.print()
        }
        Command::Show => commands::show(Config::load(home).await?).await?.print(),
        Command::Delete(a) => {
            let config = Config::load(home).await?;
            commands::delete(config, a.clone()).await?.print()
        }
    }
    Ok(())
}

/// Logs to stderr at `level`, or as directed by `RUST_LOG` when it is set.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var_os("RUST_LOG") {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "{}={level},stock_recon={level}",
            env!("CARGO_CRATE_NAME")
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
