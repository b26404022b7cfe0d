//! Implementation of the `safelink serve` command.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tracing::info;

use crate::adapters::http::CheckHttpServer;
use crate::domain::models::{Config, ServerConfig};
use crate::infrastructure::setup::{build_checker, Credentials};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of the configured server section.
    pub fn server_config(&self, configured: &ServerConfig) -> ServerConfig {
        ServerConfig {
            host: self.host.clone().unwrap_or_else(|| configured.host.clone()),
            port: self.port.unwrap_or(configured.port),
            enable_cors: configured.enable_cors,
        }
    }
}

pub async fn execute(args: ServeArgs, config: &Config) -> Result<()> {
    let server_config = args.server_config(&config.server);
    anyhow::ensure!(server_config.port != 0, "Invalid server port: must not be 0");

    let checker = Arc::new(
        build_checker(config)
            .await
            .context("Failed to initialize URL checker")?,
    );
    let credentials = Credentials::from_config(config);

    info!(
        host = %server_config.host,
        port = server_config.port,
        safe_browsing = credentials.safe_browsing,
        virustotal = credentials.virustotal,
        "starting URL check server"
    );

    CheckHttpServer::new(Arc::clone(&checker), credentials, server_config)
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("URL check server failed")?;

    checker.flush().await;
    info!("URL check server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let args = ServeArgs {
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
        };
        let server = args.server_config(&ServerConfig::default());

        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
        assert!(server.enable_cors);
    }

    #[test]
    fn test_configured_values_kept_without_overrides() {
        let args = ServeArgs {
            host: None,
            port: None,
        };
        let configured = ServerConfig {
            host: "10.0.0.5".to_string(),
            port: 9000,
            enable_cors: false,
        };

        assert_eq!(args.server_config(&configured), configured);
    }
}
