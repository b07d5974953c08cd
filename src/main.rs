//! fusion-mcp: MCP server for AI-assisted Autodesk Fusion modelling
//!
//! Speaks MCP on stdio and forwards tool calls to the `mcp-addin` listener
//! running inside Fusion.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use fusion_mcp::client::AddinClient;
use fusion_mcp::config::{self, Config};
use fusion_mcp::error::ConfigError;
use fusion_mcp::mcp::server::McpServer;

/// MCP server for AI-assisted Autodesk Fusion modelling.
///
/// Exposes code execution, viewport screenshots and parameter editing as
/// tools, and forwards each call to the Fusion add-in.
#[derive(Parser, Debug)]
#[command(name = "fusion-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Add-in host (overrides the configuration file)
    #[arg(long)]
    host: Option<String>,

    /// Add-in port (overrides the configuration file)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Applies the `--host`/`--port` overrides and validates the result.
fn apply_overrides(cfg: &mut Config, args: &Args) -> Result<(), ConfigError> {
    if let Some(host) = &args.host {
        cfg.addin.host.clone_from(host);
    }
    if let Some(port) = args.port {
        cfg.addin.port = port;
    }
    cfg.validate()
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries MCP messages.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the fusion-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = apply_overrides(&mut cfg, &args) {
        eprintln!("Configuration error: {e}");
        return ExitCode::FAILURE;
    }

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "fusion-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting fusion-mcp server"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let client = match AddinClient::new(&cfg.addin) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create add-in client");
            return ExitCode::FAILURE;
        }
    };

    info!(
        addin = client.base_url(),
        timeout_secs = cfg.addin.timeout_secs,
        "Add-in endpoint configured"
    );

    let mut server = McpServer::new(client, cfg.screenshot);

    info!("MCP server ready, waiting for client connection...");

    let result = runtime.block_on(server.run());

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(get_log_level(3, true, "trace"), Level::ERROR);
    }

    #[test]
    fn config_level_used_without_flags() {
        assert_eq!(get_log_level(0, false, "DEBUG"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "nonsense"), Level::WARN);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
    }

    #[test]
    fn port_override_parses() {
        let args = Args::try_parse_from(["fusion-mcp", "--port", "3700", "-vv"]).unwrap();
        assert_eq!(args.port, Some(3700));
        assert_eq!(args.verbose, 2);
        assert!(Args::try_parse_from(["fusion-mcp", "--port", "0"]).is_err());
    }

    #[test]
    fn overrides_replace_config_values() {
        let args =
            Args::try_parse_from(["fusion-mcp", "--host", "127.0.0.1", "--port", "3700"]).unwrap();
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, &args).unwrap();
        assert_eq!(cfg.addin.host, "127.0.0.1");
        assert_eq!(cfg.addin.port, 3700);
    }

    #[test]
    fn blank_host_override_is_rejected() {
        for host in ["", "   "] {
            let args = Args::try_parse_from(["fusion-mcp", "--host", host]).unwrap();
            let mut cfg = Config::default();
            let err = apply_overrides(&mut cfg, &args).unwrap_err();
            assert!(matches!(err, ConfigError::ValidationError { .. }));
            assert!(err.to_string().contains("addin.host"));
        }
    }

    #[test]
    fn overrides_revalidate_loaded_config() {
        let args = Args::try_parse_from(["fusion-mcp"]).unwrap();
        let mut cfg = Config::default();
        cfg.addin.timeout_secs = 0;
        assert!(apply_overrides(&mut cfg, &args).is_err());
    }
}
