//! Cat Facts MCP Server
//!
//! This binary runs an MCP server wrapping the catfact.ninja API, over either
//! stdin/stdout transport or streamable HTTP with per-session servers.

use cat_facts_mcp::config::{DEFAULT_HOST, DEFAULT_PORT};
use cat_facts_mcp::{CatFactsServer, McpService, RateLimiter, ServerConfig, SessionManager};
use clap::{Args, Parser, Subcommand};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cat-facts-mcp", version, about = "Cat Facts MCP Server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server over stdio (default, or MCP_TRANSPORT=stdio)
    Serve,
    /// Run the MCP server over streamable HTTP (or MCP_TRANSPORT=http)
    ServeHttp(ServeHttpArgs),
}

#[derive(Args)]
struct ServeHttpArgs {
    /// Bind address (e.g., 127.0.0.1:3002). Defaults to MCP_HOST/MCP_PORT.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to stderr (stdout is used for MCP protocol)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cat_facts_mcp=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(ServerConfig::from_env());
    let limiter = Arc::new(RateLimiter::new(config.rate_limit));

    let command = cli.command.unwrap_or_else(|| {
        command_for_transport(std::env::var("MCP_TRANSPORT").ok().as_deref())
    });
    match command {
        Command::Serve => run_stdio(config, limiter).await,
        Command::ServeHttp(args) => run_http(args, config, limiter).await,
    }
}

/// Transport fallback for a bare invocation: MCP_TRANSPORT selects the
/// mode (stdio|http), anything else falls back to stdio.
fn command_for_transport(transport: Option<&str>) -> Command {
    match transport {
        Some(v) if v.eq_ignore_ascii_case("http") => {
            Command::ServeHttp(ServeHttpArgs { bind: None })
        }
        _ => Command::Serve,
    }
}

async fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
            _ = tokio::signal::ctrl_c() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}

async fn run_stdio(config: Arc<ServerConfig>, limiter: Arc<RateLimiter>) -> anyhow::Result<()> {
    info!("Cat Facts MCP Server running on stdio");

    let server = CatFactsServer::new(config, limiter);
    let service = server
        .serve(stdio())
        .await
        .map_err(|e| anyhow::anyhow!("stdio transport failed: {e}"))?;

    tokio::select! {
        quit = service.waiting() => {
            // A broken stdio stream is fatal; there is no reconnect logic.
            let reason = quit.map_err(|e| anyhow::anyhow!("server task failed: {e}"))?;
            info!(?reason, "stdio transport closed");
        }
        _ = wait_for_shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn run_http(
    args: ServeHttpArgs,
    config: Arc<ServerConfig>,
    limiter: Arc<RateLimiter>,
) -> anyhow::Result<()> {
    let bind = args.bind.unwrap_or_else(|| {
        let host = std::env::var("MCP_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = std::env::var("MCP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        format!("{host}:{port}")
    });
    let bind_addr: SocketAddr = bind
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address {bind}: {e}"))?;

    let manager = Arc::new(SessionManager::new(config, limiter));
    let service = McpService::new(manager.clone());

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind failed: {e}"))?;
    info!("Cat Facts MCP Server listening on http://{bind_addr}");

    let cancel = tokio_util::sync::CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if wait_for_shutdown_signal().await.is_ok() {
            info!("Shutdown signal received");
            cancel_for_signal.cancel();
        }
    });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("HTTP server shutting down");
                break;
            }
            res = listener.accept() => {
                let (stream, _) = res.map_err(|e| anyhow::anyhow!("accept failed: {e}"))?;
                let svc = service.clone();
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let conn = http1::Builder::new()
                        .serve_connection(io, TowerToHyperService::new(svc));
                    if let Err(err) = conn.await {
                        error!("http connection error: {err}");
                    }
                });
            }
        }
    }

    manager.shutdown_all().await;
    info!("Server stopped");
    Ok(())
}
