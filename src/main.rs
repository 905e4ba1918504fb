use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cronguard::application::config::AppConfig;
use cronguard::infrastructure::channels::create_alert_router;
use cronguard::infrastructure::host::SystemHostProbe;
use cronguard::presentation::cli::app::{Cli, Commands};
use cronguard::presentation::cli::commands::alert::run_alert;
use cronguard::presentation::cli::commands::channels::run_channels;
use cronguard::presentation::cli::commands::init_db::run_init_db;
use cronguard::presentation::cli::commands::run::{build_command_job, run_job};

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        AppConfig::load_from(path, &cli.env)?
    } else {
        AppConfig::load(&cli.env)?
    };

    setup_tracing(cli.verbose || config.settings.debug);
    tracing::debug!("Environment : {}", config.env_name);

    // Manual DI: main.rs is the only place that knows concrete types
    let router = create_alert_router(&config).context("Failed to set up alert channels")?;

    match cli.command {
        Commands::Run {
            name,
            retries,
            command,
        } => {
            let mut job = build_command_job(&config, name, retries, command)?;
            let outcome = run_job(&router, &SystemHostProbe, &mut job);
            std::process::exit(outcome.exit_code);
        }
        Commands::Alert {
            level,
            title,
            detail,
            source,
        } => {
            run_alert(&router, &source, level, &title, detail.as_deref())?;
        }
        Commands::InitDb => run_init_db(&config)?,
        Commands::Channels => run_channels(&router, &config.env_name),
    }

    Ok(())
}
