// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus CLI entrypoint.
//!
//! By default this serves MCP over stdio (intended for tool integrations).
//! Use `--http-port <port>` to serve MCP over streamable HTTP at
//! `http://127.0.0.1:<port>/mcp` instead.
//!
//! The destination is read from `--config <file>` plus `PROTEUS_*` environment
//! overrides; logs go to stderr so stdio framing stays clean.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--config <file>]\n  {program} [--config <file>] --http-port <port>\n\nStdio mode (default) serves MCP on stdin/stdout for tool integrations.\n--http-port serves MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp` (0 = ephemeral).\n\nThe destination is read from the config file (JSON: url, user, password, tenant, timeout_secs)\nand overridden by PROTEUS_URL, PROTEUS_USER, PROTEUS_PASSWORD, PROTEUS_TENANT, PROTEUS_TIMEOUT_SECS."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: Option<String>,
    http_port: Option<u16>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if options.config_path.is_some() {
                    return Err(());
                }
                let path = args.next().ok_or(())?;
                options.config_path = Some(path);
            }
            "--http-port" => {
                if options.http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.http_port = Some(port);
            }
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();

        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "proteus".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let config_path = options.config_path.as_ref().map(PathBuf::from);
        let config = proteus::config::Config::load(config_path.as_deref())?;
        let connection = proteus::remote::Connection::new(&config)?;
        let mcp = proteus::mcp::ProteusMcp::new(connection);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        match options.http_port {
            None => {
                runtime.block_on(mcp.serve_stdio())?;
            }
            Some(port) => {
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
                    tracing::info!(
                        address = %listener.local_addr()?,
                        "serving MCP over streamable HTTP"
                    );

                    let config = StreamableHttpServerConfig {
                        stateful_mode: true,
                        ..StreamableHttpServerConfig::default()
                    };
                    let shutdown_token = config.cancellation_token.clone();

                    let session_manager = Arc::new(LocalSessionManager::default());
                    let mcp_service = {
                        let mcp = mcp.clone();
                        StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config)
                    };

                    let router = Router::new().nest_service("/mcp", mcp_service);
                    let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                        shutdown_token.cancelled().await;
                    });
                    serve.await?;
                    Ok::<(), Box<dyn Error>>(())
                })?;
            }
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("proteus: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_config_path() {
        let options = parse_options(["--config".to_owned(), "dest.json".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.config_path.as_deref(), Some("dest.json"));
        assert_eq!(options.http_port, None);
    }

    #[test]
    fn parses_http_port() {
        let options = parse_options(["--http-port".to_owned(), "1234".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.http_port, Some(1234));
    }

    #[test]
    fn parses_config_and_http_port_in_any_order() {
        let options = parse_options(
            [
                "--http-port".to_owned(),
                "0".to_owned(),
                "--config".to_owned(),
                "dest.json".to_owned(),
            ]
            .into_iter(),
        )
        .expect("parse options");
        assert_eq!(options.http_port, Some(0));
        assert_eq!(options.config_path.as_deref(), Some("dest.json"));
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(["--nope".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(
            ["--config".to_owned(), "a".to_owned(), "--config".to_owned(), "b".to_owned()]
                .into_iter(),
        )
        .unwrap_err();

        parse_options(
            [
                "--http-port".to_owned(),
                "1".to_owned(),
                "--http-port".to_owned(),
                "2".to_owned(),
            ]
            .into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_missing_values() {
        parse_options(["--config".to_owned()].into_iter()).unwrap_err();
        parse_options(["--http-port".to_owned()].into_iter()).unwrap_err();
        parse_options(["--http-port".to_owned(), "port".to_owned()].into_iter()).unwrap_err();
    }
}
