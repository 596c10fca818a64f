use std::io;

use prx_websearch_mcp::{McpServer, ServerConfig, Transport};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    // stdout carries JSON-RPC frames.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let server = McpServer::from_config(&config)?;
    match config.transport {
        Transport::Stdio => server.serve_stdio(),
        Transport::Http => server.serve_http(&config.http_addr),
    }
}
