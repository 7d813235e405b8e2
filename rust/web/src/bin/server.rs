//! Standalone game server binary
//!
//! Usage: cargo run -p gang_web --bin gang-server -- [OPTIONS]

use clap::Parser;
use gang_web::{AppSettings, SettingsOverrides, WebServer};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gang-server", about = "Hosts one chip game over WebSocket")]
struct Args {
    /// TOML settings file (defaults to $GANG_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    overrides: SettingsOverrides,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let settings = AppSettings::load(args.config.as_deref(), &args.overrides)?;

    gang_web::init_logging(&settings.log_filter);

    tracing::info!(
        host = %settings.host,
        port = settings.port,
        static_dir = %settings.static_dir.display(),
        "starting game server"
    );

    let server = WebServer::new(settings.server_config())?;
    let handle = server.start().await?;

    println!("Server running at http://{}", handle.address());
    println!("   Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down");
    handle.shutdown().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn flags_parse_into_overrides() {
        let args = Args::try_parse_from([
            "gang-server",
            "--config",
            "gang.toml",
            "-p",
            "4000",
            "-d",
            "client/dist",
            "--seed",
            "5",
        ])
        .expect("valid flags");

        assert_eq!(args.config, Some(PathBuf::from("gang.toml")));
        assert_eq!(
            args.overrides,
            SettingsOverrides {
                host: None,
                port: Some(4000),
                static_dir: Some(PathBuf::from("client/dist")),
                seed: Some(5),
            }
        );
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }
}
