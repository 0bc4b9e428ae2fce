//! Internal HTTP clients for README download and chat completions

use anyhow::{Context, Result};
use base64::Engine;
use regex::Regex;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use super::{build_prompt, DEFAULT_API_URL, README_MAX_CHARS};
use crate::pipeline::Summarizer;
use crate::properties::truncate;

const RAW_BASE: &str = "https://raw.githubusercontent.com";
const API_BASE: &str = "https://api.github.com";
const README_NAMES: [&str; 3] = ["README.md", "readme.md", "README"];
const BRANCHES: [&str; 2] = ["main", "master"];

/// Downloads a repository README from raw content, then the contents API.
pub struct ReadmeFetcher {
    raw_base: String,
    api_base: String,
    token: Option<String>,
    http: HttpClient,
}

impl ReadmeFetcher {
    pub fn new(token: Option<String>, timeout: Duration, proxy: Option<&str>) -> Result<Self> {
        Ok(Self {
            raw_base: RAW_BASE.to_string(),
            api_base: API_BASE.to_string(),
            token: token.filter(|t| !t.is_empty()),
            http: crate::http::client(timeout, proxy)?,
        })
    }

    /// Override both hosts (tests).
    pub fn with_bases(mut self, raw_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.raw_base = raw_base.into();
        self.api_base = api_base.into();
        self
    }

    /// README text truncated to [`README_MAX_CHARS`], or `None` if absent.
    pub fn fetch(&self, owner: &str, name: &str) -> Option<String> {
        for readme in README_NAMES {
            for branch in BRANCHES {
                let url = format!("{}/{}/{}/{}/{}", self.raw_base, owner, name, branch, readme);
                if let Some(text) = self.get_text(&url, "application/vnd.github.v3.raw") {
                    return Some(truncate(&text, README_MAX_CHARS));
                }
            }
        }

        match self.fetch_from_api(owner, name) {
            Ok(text) => Some(truncate(&text, README_MAX_CHARS)),
            Err(e) => {
                debug!(repo = %format!("{}/{}", owner, name), "README not available: {:#}", e);
                None
            }
        }
    }

    fn get_text(&self, url: &str, accept: &str) -> Option<String> {
        let mut request = self.http.get(url).header("Accept", accept);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }
        let response = request.send().ok()?;
        if response.status() != reqwest::StatusCode::OK {
            return None;
        }
        response.text().ok()
    }

    fn fetch_from_api(&self, owner: &str, name: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct Contents {
            #[serde(default)]
            content: String,
        }

        let url = format!("{}/repos/{}/{}/readme", self.api_base, owner, name);
        let mut request = self.http.get(&url).header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }

        let response = request.send().context("Failed to reach GitHub API")?;
        if !response.status().is_success() {
            anyhow::bail!("GitHub API returned status: {}", response.status());
        }

        let contents: Contents = response.json().context("Failed to parse README response")?;
        // the API wraps base64 at 60 columns
        let encoded: String = contents.content.split_whitespace().collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .context("README content is not valid base64")?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Chat-completions backed summarizer.
pub struct ChatSummarizer {
    api_url: String,
    api_key: String,
    model: String,
    readme: ReadmeFetcher,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

impl ChatSummarizer {
    pub fn new(
        api_url: Option<&str>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        readme: ReadmeFetcher,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            api_url: api_url
                .filter(|u| !u.is_empty())
                .unwrap_or(DEFAULT_API_URL)
                .to_string(),
            api_key: api_key.into(),
            model: model.into(),
            readme,
            // the completion endpoint is called directly, never through the proxy
            http: crate::http::client(timeout, None)?,
        })
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: 500,
            temperature: 0.7,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .with_context(|| format!("Failed to reach {}", self.api_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!(
                "Completion API error {}: {}",
                status,
                crate::http::snippet(&body, 100)
            );
        }

        let reply: ChatResponse = response.json().context("Failed to parse completion response")?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        let summary = strip_code_fence(&content);
        if summary.is_empty() {
            anyhow::bail!("Completion API returned an empty summary");
        }
        Ok(summary)
    }
}

impl Summarizer for ChatSummarizer {
    fn summarize(&self, owner: &str, name: &str, description: &str) -> Result<String> {
        let readme = self
            .readme
            .fetch(owner, name)
            .with_context(|| format!("No README found for {}/{}", owner, name))?;
        self.complete(&build_prompt(owner, name, description, &readme))
    }
}

fn fence_res() -> &'static (Regex, Regex) {
    static RES: OnceLock<(Regex, Regex)> = OnceLock::new();
    RES.get_or_init(|| {
        (
            Regex::new(r"^```[a-zA-Z]*\n").expect("valid fence pattern"),
            Regex::new(r"\n```$").expect("valid fence pattern"),
        )
    })
}

/// Trim a reply and drop a Markdown code fence wrapped around it.
pub fn strip_code_fence(content: &str) -> String {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let (open, close) = fence_res();
    let inner = open.replace(trimmed, "");
    close.replace(&inner, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetcher(server: &mockito::Server) -> ReadmeFetcher {
        ReadmeFetcher::new(None, Duration::from_secs(5), None)
            .unwrap()
            .with_bases(server.url(), server.url())
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  plain  "), "plain");
        assert_eq!(strip_code_fence("```markdown\n**What**: x\n```"), "**What**: x");
        assert_eq!(strip_code_fence("```\nbody\n```"), "body");
    }

    #[test]
    fn test_readme_falls_back_to_master() {
        let mut server = mockito::Server::new();
        let _main = server.mock("GET", "/o/n/main/README.md").with_status(404).create();
        let _master = server
            .mock("GET", "/o/n/master/README.md")
            .with_status(200)
            .with_body("# Hello")
            .create();

        assert_eq!(fetcher(&server).fetch("o", "n").as_deref(), Some("# Hello"));
    }

    #[test]
    fn test_readme_from_contents_api() {
        let mut server = mockito::Server::new();
        let _raw = server
            .mock("GET", mockito::Matcher::Regex(r"^/o/n/".into()))
            .with_status(404)
            .create();
        let encoded = base64::engine::general_purpose::STANDARD.encode("# From API");
        let _api = server
            .mock("GET", "/repos/o/n/readme")
            .with_status(200)
            .with_body(json!({ "content": format!("{}\n", encoded) }).to_string())
            .create();

        assert_eq!(fetcher(&server).fetch("o", "n").as_deref(), Some("# From API"));
    }

    #[test]
    fn test_readme_missing_everywhere() {
        let mut server = mockito::Server::new();
        let _any = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(404)
            .create();

        assert_eq!(fetcher(&server).fetch("o", "n"), None);
    }

    #[test]
    fn test_summarize_end_to_end() {
        let mut server = mockito::Server::new();
        let _readme = server
            .mock("GET", "/o/n/main/README.md")
            .with_status(200)
            .with_body("# Tool\nDoes things.")
            .create();
        let completion = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer key")
            .match_body(mockito::Matcher::PartialJson(json!({ "model": "m", "max_tokens": 500 })))
            .with_status(200)
            .with_body(
                json!({ "choices": [{ "message": { "content": "```\nA tool.\n```" } }] }).to_string(),
            )
            .create();

        let api_url = format!("{}/v1/chat/completions", server.url());
        let summarizer =
            ChatSummarizer::new(Some(&api_url), "key", "m", fetcher(&server), Duration::from_secs(5))
                .unwrap();

        assert_eq!(summarizer.summarize("o", "n", "desc").unwrap(), "A tool.");
        completion.assert();
    }

    #[test]
    fn test_summarize_api_error() {
        let mut server = mockito::Server::new();
        let _readme = server
            .mock("GET", "/o/n/main/README.md")
            .with_status(200)
            .with_body("# Tool")
            .create();
        let _completion = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .create();

        let api_url = format!("{}/v1/chat/completions", server.url());
        let summarizer =
            ChatSummarizer::new(Some(&api_url), "key", "m", fetcher(&server), Duration::from_secs(5))
                .unwrap();

        let err = summarizer.summarize("o", "n", "").unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
