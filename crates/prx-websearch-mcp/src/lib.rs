pub mod config;
pub mod protocol;
pub mod server;
pub mod transport;

pub use config::{ServerConfig, Transport};
pub use server::McpServer;
