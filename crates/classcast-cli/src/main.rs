//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use classcast_cli::{Cli, CliError, Commands, handlers, load_settings};
use classcast_core::NetworkMetrics;

const DEFAULT_LOG_FILTER: &str = "classcast=info,tower_http=info";

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("classcast=debug,tower_http=debug")
        } else {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn exit_with(err: &CliError) -> ! {
    eprintln!("Error: {err}");
    std::process::exit(err.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads environment defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let result = match command {
        Commands::Serve { settings } => {
            let settings = match load_settings(cli.config.as_deref(), &settings.overrides()) {
                Ok(settings) => settings,
                Err(e) => exit_with(&e),
            };
            return handlers::serve::execute(settings).await;
        }
        Commands::Profiles { json } => handlers::profiles::execute(json),
        Commands::Recommend {
            latency,
            bandwidth,
            loss,
            jitter,
            json,
        } => handlers::recommend::execute(NetworkMetrics::new(latency, bandwidth, loss, jitter), json)
            .map(|_| ()),
        Commands::Config { settings } => load_settings(cli.config.as_deref(), &settings.overrides())
            .and_then(|settings| handlers::config::execute(&settings)),
    };

    if let Err(e) = result {
        exit_with(&e);
    }
    Ok(())
}
