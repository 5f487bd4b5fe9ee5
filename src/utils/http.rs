//! HTTP client construction shared by the node RPC and rate clients.

use reqwest::blocking::Client;
use std::time::Duration;

use crate::error::{ToolError, ToolResult};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a blocking client with the tool's timeouts and user agent.
pub fn create_client() -> ToolResult<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_nodelay(true)
        .user_agent(concat!("ethereum-tool/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ToolError::internal(format!("Failed to create HTTP client: {}", e)))
}
