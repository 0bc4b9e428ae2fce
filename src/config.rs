//! Layered configuration: TOML file, then `.env`, then environment.
//!
//! All sections are optional and default to the public endpoints, so an
//! empty or missing file is valid. Credentials normally come from the
//! environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::trending::Period;

// =============================================================================
// Config Types
// =============================================================================

/// Configuration stored in ~/.trending-sync/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notion: NotionSection,
    #[serde(default)]
    pub github: GithubSection,
    #[serde(default)]
    pub enrichment: EnrichmentSection,
    #[serde(default)]
    pub network: NetworkSection,
    #[serde(default)]
    pub fields: FieldsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionSection {
    /// Integration token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Target database id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    #[serde(default = "default_notion_url")]
    pub api_url: String,
    #[serde(default = "default_notion_version")]
    pub version: String,
}

fn default_notion_url() -> String {
    crate::notion::DEFAULT_API_URL.to_string()
}
fn default_notion_version() -> String {
    crate::notion::DEFAULT_API_VERSION.to_string()
}

impl Default for NotionSection {
    fn default() -> Self {
        Self {
            token: None,
            database_id: None,
            api_url: default_notion_url(),
            version: default_notion_version(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubSection {
    /// Token for README downloads (raises the API rate limit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_trending_url")]
    pub trending_url: String,
    #[serde(default)]
    pub period: Period,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_trending_url() -> String {
    crate::trending::DEFAULT_TRENDING_URL.to_string()
}
fn default_limit() -> usize {
    crate::listing::DEFAULT_LIMIT
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            token: None,
            trending_url: default_trending_url(),
            period: Period::default(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentSection {
    /// Chat-completions key; no key means no summaries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_url")]
    pub api_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
}

fn default_llm_url() -> String {
    crate::enrich::DEFAULT_API_URL.to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for EnrichmentSection {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_llm_url(),
            model: default_llm_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSection {
    /// HTTP(S) proxy for GitHub and Notion traffic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default = "default_write_delay")]
    pub write_delay_ms: u64,
    #[serde(default = "default_enrich_delay")]
    pub enrich_delay_ms: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_write_delay() -> u64 {
    300
}
fn default_enrich_delay() -> u64 {
    500
}
fn default_timeout() -> u64 {
    30
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            proxy: None,
            write_delay_ms: default_write_delay(),
            enrich_delay_ms: default_enrich_delay(),
            timeout_secs: default_timeout(),
        }
    }
}

impl NetworkSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn write_delay(&self) -> Duration {
        Duration::from_millis(self.write_delay_ms)
    }

    pub fn enrich_delay(&self) -> Duration {
        Duration::from_millis(self.enrich_delay_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldsSection {
    /// Extra column labels per semantic key, e.g. `stars = ["Sterne"]`
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

// =============================================================================
// Load
// =============================================================================

impl Config {
    /// Load from `path`, then apply `.env` and process environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        dotenvy::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// File contents only; a missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Override values with whatever `lookup` finds; blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("NOTION_TOKEN") {
            self.notion.token = Some(v);
        }
        if let Some(v) = get("NOTION_DATABASE_ID") {
            self.notion.database_id = Some(v);
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.github.token = Some(v);
        }
        if let Some(v) = get("LLM_API_KEY") {
            self.enrichment.api_key = Some(v);
        }
        if let Some(v) = get("LLM_API_URL") {
            self.enrichment.api_url = v;
        }
        if let Some(v) = get("LLM_MODEL") {
            self.enrichment.model = v;
        }
        if let Some(v) = get("PROXY") {
            self.network.proxy = Some(v);
        }
    }

    /// Notion token, or a configuration error naming where to set it.
    pub fn notion_token(&self) -> Result<&str> {
        self.notion
            .token
            .as_deref()
            .context("Notion token not configured (set NOTION_TOKEN or [notion] token)")
    }

    /// Database id from `override_id`, else the configured one.
    pub fn database_id<'a>(&'a self, override_id: Option<&'a str>) -> Result<&'a str> {
        override_id
            .or(self.notion.database_id.as_deref())
            .context("Notion database id not configured (set NOTION_DATABASE_ID, [notion] database_id or --database)")
    }
}
