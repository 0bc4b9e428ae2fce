//! Internal HTTP client for the trending page

use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use tracing::debug;

use super::{Period, DEFAULT_TRENDING_URL};
use crate::pipeline::ListingSource;

// The listing page serves a reduced layout to non-browser agents.
const BROWSER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches the trending listing document.
pub struct TrendingClient {
    url: String,
    http: HttpClient,
}

impl TrendingClient {
    pub fn new(url: Option<&str>, timeout: Duration, proxy: Option<&str>) -> Result<Self> {
        Ok(Self {
            url: url
                .filter(|u| !u.is_empty())
                .unwrap_or(DEFAULT_TRENDING_URL)
                .trim_end_matches('/')
                .to_string(),
            http: crate::http::client(timeout, proxy)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ListingSource for TrendingClient {
    fn fetch_listing(&self, period: Period) -> Result<String> {
        debug!(url = %self.url, %period, "fetching trending listing");
        let response = self
            .http
            .get(&self.url)
            .query(&[("since", period.as_str())])
            .header(USER_AGENT, BROWSER_AGENT)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .with_context(|| format!("Failed to fetch {}", self.url))?;

        if !response.status().is_success() {
            anyhow::bail!("Trending page returned status: {}", response.status());
        }

        response.text().context("Failed to read trending page body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_listing_sends_period() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/trending")
            .match_query(mockito::Matcher::UrlEncoded("since".into(), "weekly".into()))
            .with_status(200)
            .with_body("<html>listing</html>")
            .create();

        let url = format!("{}/trending", server.url());
        let client = TrendingClient::new(Some(&url), Duration::from_secs(5), None).unwrap();
        let body = client.fetch_listing(Period::Weekly).unwrap();

        assert_eq!(body, "<html>listing</html>");
        mock.assert();
    }

    #[test]
    fn test_fetch_listing_error_status() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/trending")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create();

        let url = format!("{}/trending", server.url());
        let client = TrendingClient::new(Some(&url), Duration::from_secs(5), None).unwrap();
        let err = client.fetch_listing(Period::Daily).unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_default_url() {
        let client = TrendingClient::new(None, Duration::from_secs(5), None).unwrap();
        assert_eq!(client.url(), DEFAULT_TRENDING_URL);
    }
}
