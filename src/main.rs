//! Process bootstrap: logging, CLI, startup diagnostics, serve.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use load_target::config::{Cli, ServerConfig};
use load_target::http::StubServer;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "load_target=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_cli(&cli);
    log_process_info(&config);

    if let Err(err) = StubServer::new(config).bind_and_run().await {
        tracing::error!(error = %err, "Error starting the application");
        std::process::exit(1);
    }
}

/// Startup diagnostics, logged once before binding.
fn log_process_info(config: &ServerConfig) {
    let processors = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    tracing::info!(
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        pid = std::process::id(),
        processors,
        "Process info"
    );
    if let Some(limit) = max_open_files() {
        tracing::info!(max_open_files = %limit, "Resource limits");
    }
    tracing::info!(
        port = config.port,
        workers = config.workers,
        "Configuration loaded"
    );
}

/// Soft open-files limit, where the platform exposes it through the shell.
fn max_open_files() -> Option<String> {
    if cfg!(windows) {
        return None;
    }
    let output = std::process::Command::new("sh")
        .arg("-c")
        .arg("ulimit -Sn")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let limit = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!limit.is_empty()).then_some(limit)
}
