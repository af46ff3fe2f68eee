use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use weather_core::{Config, WeatherService};

use crate::routes;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather backend HTTP server")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listening port. Takes precedence over `PORT` and the config file.
    #[arg(long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Resolve configuration: file, then `PORT`, then flags.
    pub fn resolve_config(&self, env_port: Option<&str>) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        config.apply_port_override(env_port)?;
        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(config)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let env_port = std::env::var("PORT").ok();
        let config = self.resolve_config(env_port.as_deref())?;

        let service = WeatherService::from_config(&config);
        let app = routes::router(service, &config.server.allowed_origins)?;

        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        tracing::info!("Server running on port {}", config.server.port);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flag_beats_env_beats_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[server]\nport = 6000\n").expect("write");
        let path = file.path().to_path_buf();

        let cli = Cli { config: Some(path.clone()), port: None };
        assert_eq!(cli.resolve_config(None).expect("config").server.port, 6000);
        assert_eq!(cli.resolve_config(Some("6100")).expect("config").server.port, 6100);

        let cli = Cli { config: Some(path), port: Some(6200) };
        assert_eq!(cli.resolve_config(Some("6100")).expect("config").server.port, 6200);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let cli = Cli { config: Some(PathBuf::from("/nonexistent/weather.toml")), port: None };

        let err = cli.resolve_config(None).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from(["weather-server", "--port", "8081"]).expect("parse");

        assert_eq!(cli.port, Some(8081));
        assert!(cli.config.is_none());
    }
}
