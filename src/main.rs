//! pvlive: live view of beamline process variables.
//!
//! ```bash
//! pvlive                           # default config, Delta and Eta preloaded
//! pvlive --config beamline.yaml    # custom config
//! pvlive --session last.json --no-default-parameters
//! RUST_LOG=debug pvlive            # verbose logging
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use pvlive::channel::ChannelClient;
use pvlive::config::AppConfig;
use pvlive::run_app;

#[derive(Parser)]
#[command(name = "pvlive")]
#[command(about = "Live monitoring of beamline process variables", long_about = None)]
struct Cli {
    /// YAML config file (default: $HOME/.pvlive/config.yaml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON session file to load at startup
    #[arg(long)]
    session: Option<PathBuf>,

    /// Window title
    #[arg(long)]
    title: Option<String>,

    /// Skip the parameters listed in the config
    #[arg(long)]
    no_default_parameters: bool,
}

fn load_config(cli: &Cli) -> Result<AppConfig, pvlive::error::ConfigError> {
    let mut cfg = match &cli.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            AppConfig::load(path)?
        }
        None => AppConfig::load_from_default_path()?.unwrap_or_default(),
    };
    if let Some(title) = &cli.title {
        cfg.title = title.clone();
    }
    Ok(cfg)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let client: Arc<dyn ChannelClient> = Arc::new(cfg.build_sim_client());
    match run_app(cfg, client, !cli.no_default_parameters, cli.session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
