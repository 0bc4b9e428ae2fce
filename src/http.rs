//! Shared blocking HTTP client construction.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

/// User agent for API calls (GitHub API rejects requests without one).
pub const USER_AGENT: &str = concat!("trending-sync/", env!("CARGO_PKG_VERSION"));

/// Build a client with a fixed timeout and an optional HTTP(S) proxy.
pub fn client(timeout: Duration, proxy: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder().timeout(timeout).user_agent(USER_AGENT);

    if let Some(proxy) = proxy.filter(|p| !p.is_empty()) {
        builder = builder.proxy(
            reqwest::Proxy::all(proxy).with_context(|| format!("Invalid proxy URL: {}", proxy))?,
        );
    }

    builder.build().context("Failed to create HTTP client")
}

/// First `max` characters of a response body, for error messages.
pub fn snippet(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}
