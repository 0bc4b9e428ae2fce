//! Listing document → repository records.
//!
//! "Do X": Turn the trending page into typed `Repository` values.
//!
//! The page is split into one fragment per listed repository. Each fragment
//! is parsed on its own; a fragment without a usable `owner/name` link is
//! skipped, never fatal.

mod today;

pub use today::stars_today;

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::magnitude;
use crate::repository::Repository;

/// Default number of fragments processed per page.
pub const DEFAULT_LIMIT: usize = 10;

macro_rules! selector {
    ($css:expr) => {{
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        SELECTOR.get_or_init(|| Selector::parse($css).expect("valid selector"))
    }};
}

/// Extracts records, stamping every one with the run's observation time.
#[derive(Debug, Clone, Copy)]
pub struct RecordExtractor {
    observed_at: NaiveDateTime,
}

impl RecordExtractor {
    pub fn new(observed_at: NaiveDateTime) -> Self {
        Self { observed_at }
    }

    pub fn observed_at(&self) -> NaiveDateTime {
        self.observed_at
    }

    /// Parse the first `limit` fragments of a listing document, in page order.
    pub fn extract_all(&self, document: &str, limit: usize) -> Vec<Repository> {
        let html = Html::parse_document(document);

        let mut fragments: Vec<ElementRef> = html.select(selector!("article.Box-row")).collect();
        if fragments.is_empty() {
            fragments = html.select(selector!("article")).collect();
        }
        debug!(count = fragments.len(), "listing fragments found");

        fragments
            .into_iter()
            .take(limit)
            .filter_map(|fragment| match self.try_extract(fragment) {
                Ok(repo) => Some(repo),
                Err(e) => {
                    warn!("skipping fragment: {}", e);
                    None
                }
            })
            .collect()
    }

    /// One fragment → record, or `None` when it has no repository identity.
    pub fn extract(&self, fragment: ElementRef) -> Option<Repository> {
        self.try_extract(fragment).ok()
    }

    /// Convenience for a fragment held as an HTML string.
    pub fn extract_html(&self, fragment_html: &str) -> Option<Repository> {
        let html = Html::parse_fragment(fragment_html);
        self.extract(html.root_element())
    }

    /// Like [`extract`](Self::extract), but says why a fragment was rejected.
    pub fn try_extract(&self, fragment: ElementRef) -> Result<Repository, SyncError> {
        let href = primary_link(fragment).ok_or_else(|| SyncError::unparseable("no heading link"))?;
        let (owner, name) = repo_identity(href)
            .ok_or_else(|| SyncError::unparseable(format!("`{}` is not an owner/name link", href)))?;

        let mut repo = Repository::new(owner, name, self.observed_at);

        let description = first_text(fragment, selector!("p"));
        if !description.is_empty() {
            repo.description = description;
        }

        let language = first_text(fragment, selector!(r#"[itemprop="programmingLanguage"]"#));
        if !language.is_empty() {
            repo.language = language;
        }

        for link in fragment.select(selector!("a[href]")) {
            let target = link.value().attr("href").unwrap_or_default();
            if target.contains("/stargazers") {
                repo.stars = magnitude::parse(&element_text(link));
            } else if target.contains("/forks") {
                repo.forks = Some(magnitude::parse(&element_text(link)));
            }
        }

        let labels: Vec<String> = fragment.select(selector!("span")).map(element_text).collect();
        repo.today_stars = stars_today(
            &element_text(fragment),
            labels.iter().map(String::as_str),
            repo.stars,
        );

        Ok(repo)
    }
}

/// `href` of the first anchor inside the fragment's primary heading.
fn primary_link(fragment: ElementRef) -> Option<&str> {
    let heading = fragment
        .select(selector!("h2.lh-condensed, h3.lh-condensed"))
        .next()
        .or_else(|| {
            fragment
                .select(selector!("h1, h2, h3"))
                .find(|h| h.select(selector!("a")).next().is_some())
        })?;

    heading.select(selector!("a")).next()?.value().attr("href")
}

/// Split a repository link into exactly `(owner, name)`.
///
/// Accepts relative (`/owner/name`) and absolute
/// (`https://github.com/owner/name`) forms; anything with more or fewer
/// path segments is rejected.
pub fn repo_identity(href: &str) -> Option<(&str, &str)> {
    let path = match href.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
        None => href,
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let mut segments = path.trim().trim_matches('/').split('/');
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let name = segments.next().filter(|s| !s.is_empty())?;
    if segments.next().is_some() {
        return None;
    }
    Some((owner, name))
}

fn first_text(fragment: ElementRef, selector: &Selector) -> String {
    fragment.select(selector).next().map(element_text).unwrap_or_default()
}

/// Element text with whitespace runs collapsed to single spaces.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
