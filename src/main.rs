//! gpu-guardian - runtime binary wrapper
//!
//! Resolves the guardian binary and runs it with the wrapper's arguments.

use clap::Parser;
use console::style;
use gpu_guardian::cli::{self, Cli};
use gpu_guardian::config::{ConfigManager, ResolverConfig};
use gpu_guardian::error::{GuardianError, GuardianResult};
use gpu_guardian::Resolver;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> GuardianResult<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so the forwarded binary owns stdout
    let filter = EnvFilter::try_from_env("GUARDIAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new("gpu_guardian=warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    if std::env::var("GUARDIAN_LOG_FORMAT").is_ok_and(|f| f == "json") {
        builder.json().init();
    } else {
        builder.init();
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    debug!("Loading config from {}", config_manager.path().display());
    let config = config_manager.load().await?;

    let resolver_config = ResolverConfig::default()
        .with_file(&config.resolver)
        .with_env(|key| std::env::var(key).ok());

    let location = tokio::task::spawn_blocking(move || Resolver::new(resolver_config).resolve())
        .await
        .map_err(|e| GuardianError::Internal(format!("resolver task failed: {}", e)))??;

    let code = cli::forward(&location.path, &cli.args).await?;
    Ok(cli::exit_code(code))
}
