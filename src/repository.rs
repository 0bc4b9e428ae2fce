//! Repository records and the semantic keys they expose.
//!
//! A `Repository` is built once by the listing extractor and never mutated;
//! enrichment produces a new value via [`Repository::with_summary`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout written for the observation time.
pub const OBSERVED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Placeholder for a missing description.
pub const NO_DESCRIPTION: &str = "No description";

/// Placeholder for a missing language annotation.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// A trending repository as seen on the listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub url: String,
    pub stars: u64,
    pub forks: Option<u64>,
    pub today_stars: u64,
    pub language: String,
    pub owner: String,
    pub observed_at: NaiveDateTime,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub topics: Vec<String>,
    pub license: Option<String>,
    pub open_issues: Option<u64>,
    pub summary: Option<String>,
}

impl Repository {
    /// Minimal record for an `owner/name` pair; counts start at zero.
    pub fn new(owner: &str, name: &str, observed_at: NaiveDateTime) -> Self {
        Self {
            name: name.to_string(),
            full_name: format!("{}/{}", owner, name),
            description: NO_DESCRIPTION.to_string(),
            url: format!("https://github.com/{}/{}", owner, name),
            stars: 0,
            forks: None,
            today_stars: 0,
            language: UNKNOWN_LANGUAGE.to_string(),
            owner: owner.to_string(),
            observed_at,
            created_at: None,
            updated_at: None,
            topics: Vec::new(),
            license: None,
            open_issues: None,
            summary: None,
        }
    }

    /// Copy of this record carrying an enrichment summary.
    pub fn with_summary(&self, summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..self.clone()
        }
    }

    /// Value for a semantic key, in a shape the serializer understands.
    pub fn field(&self, key: FieldKey) -> FieldValue {
        match key {
            FieldKey::Name => FieldValue::text(&self.name),
            FieldKey::FullName => FieldValue::text(&self.full_name),
            FieldKey::Description => FieldValue::text(&self.description),
            FieldKey::Url => FieldValue::text(&self.url),
            FieldKey::Stars => FieldValue::count(self.stars),
            FieldKey::Language => FieldValue::text(&self.language),
            FieldKey::Forks => self.forks.map(FieldValue::count).into(),
            FieldKey::Owner => FieldValue::text(&self.owner),
            FieldKey::CreatedAt => self.created_at.as_deref().map(FieldValue::text).into(),
            FieldKey::UpdatedAt => self.updated_at.as_deref().map(FieldValue::text).into(),
            FieldKey::OpenIssues => self.open_issues.map(FieldValue::count).into(),
            FieldKey::Topics => FieldValue::List(self.topics.clone()),
            FieldKey::License => self.license.as_deref().map(FieldValue::text).into(),
            FieldKey::TodayStars => FieldValue::count(self.today_stars),
            FieldKey::Date => FieldValue::Text(self.observed_at.format(OBSERVED_AT_FORMAT).to_string()),
            FieldKey::Summary => self.summary.as_deref().map(FieldValue::text).into(),
        }
    }
}

/// Loosely typed field value handed to the property serializer.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Number(i64),
    Bool(bool),
    List(Vec<String>),
}

impl FieldValue {
    fn text(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }

    // Counts past i64::MAX saturate instead of wrapping negative.
    fn count(n: u64) -> Self {
        FieldValue::Number(i64::try_from(n).unwrap_or(i64::MAX))
    }

    /// Null, blank text and empty lists count as empty; numbers never do.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Number(_) | FieldValue::Bool(_) => false,
        }
    }

    /// Truthiness for checkbox columns.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Number(n) => *n != 0,
            FieldValue::Bool(b) => *b,
            FieldValue::List(items) => !items.is_empty(),
        }
    }
}

impl From<Option<FieldValue>> for FieldValue {
    fn from(value: Option<FieldValue>) -> Self {
        value.unwrap_or(FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// Semantic keys, declared in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Name,
    FullName,
    Description,
    Url,
    Stars,
    Language,
    Forks,
    Owner,
    CreatedAt,
    UpdatedAt,
    OpenIssues,
    Topics,
    License,
    TodayStars,
    Date,
    Summary,
}

impl FieldKey {
    /// All keys in the order the matcher claims columns.
    pub const ALL: [FieldKey; 16] = [
        FieldKey::Name,
        FieldKey::FullName,
        FieldKey::Description,
        FieldKey::Url,
        FieldKey::Stars,
        FieldKey::Language,
        FieldKey::Forks,
        FieldKey::Owner,
        FieldKey::CreatedAt,
        FieldKey::UpdatedAt,
        FieldKey::OpenIssues,
        FieldKey::Topics,
        FieldKey::License,
        FieldKey::TodayStars,
        FieldKey::Date,
        FieldKey::Summary,
    ];

    /// Identifier used for fuzzy matching and in config files.
    pub fn id(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::FullName => "full_name",
            FieldKey::Description => "description",
            FieldKey::Url => "url",
            FieldKey::Stars => "stars",
            FieldKey::Language => "language",
            FieldKey::Forks => "forks",
            FieldKey::Owner => "owner",
            FieldKey::CreatedAt => "created_at",
            FieldKey::UpdatedAt => "updated_at",
            FieldKey::OpenIssues => "open_issues",
            FieldKey::Topics => "topics",
            FieldKey::License => "license",
            FieldKey::TodayStars => "today_stars",
            FieldKey::Date => "date",
            FieldKey::Summary => "summary",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }

    /// Keys written even when their value is zero or default.
    pub fn always_present(self) -> bool {
        matches!(self, FieldKey::Date | FieldKey::TodayStars)
    }

    /// Built-in column labels this key answers to.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            FieldKey::Name => &["name", "title", "project", "repository", "repo", "项目名称", "名称"],
            FieldKey::FullName => &["full name", "fullname", "full_name", "repo", "repository", "完整名称", "全名"],
            FieldKey::Description => &["description", "desc", "about", "summary", "intro", "描述", "简介"],
            FieldKey::Url => &["url", "link", "github", "github url", "repository url", "项目链接", "链接", "地址"],
            FieldKey::Stars => &["stars", "star", "stargazers", "星标数", "总星标数", "点赞数", "stars数"],
            FieldKey::Language => &["language", "lang", "编程语言", "语言", "技术栈", "tech stack"],
            FieldKey::Forks => &["forks", "fork", "fork count", "分支数", "fork数"],
            FieldKey::Owner => &["owner", "author", "creator", "maintainer", "用户", "作者", "所有者"],
            FieldKey::CreatedAt => &["created", "created at", "create date", "date created", "创建时间", "创建日期"],
            FieldKey::UpdatedAt => &["updated", "updated at", "last updated", "update date", "更新时间", "更新日期"],
            FieldKey::OpenIssues => &["issues", "open issues", "issue count", "问题数", "issues数"],
            FieldKey::Topics => &["topics", "tags", "labels", "subject", "主题", "标签"],
            FieldKey::License => &["license", "licence", "许可证", "授权"],
            FieldKey::TodayStars => &["今日新增", "today stars", "new stars"],
            FieldKey::Date => &["日期", "date", "时间", "time"],
            FieldKey::Summary => &["仓库详情", "ai解析描述", "仓库描述", "ai description", "detail", "details", "ai总结", "ai摘要"],
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn observed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_applies_placeholders() {
        let repo = Repository::new("rust-lang", "rust", observed());
        assert_eq!(repo.full_name, "rust-lang/rust");
        assert_eq!(repo.url, "https://github.com/rust-lang/rust");
        assert_eq!(repo.description, NO_DESCRIPTION);
        assert_eq!(repo.language, UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_field_values() {
        let mut repo = Repository::new("a", "b", observed());
        repo.stars = 42;

        assert_eq!(repo.field(FieldKey::Stars), FieldValue::Number(42));
        assert_eq!(repo.field(FieldKey::Forks), FieldValue::Null);
        assert_eq!(repo.field(FieldKey::Topics), FieldValue::List(vec![]));
        assert_eq!(
            repo.field(FieldKey::Date),
            FieldValue::Text("2026-10-17T09:00:00".to_string())
        );
    }

    #[test]
    fn test_huge_counts_saturate() {
        let mut repo = Repository::new("a", "b", observed());
        repo.stars = crate::magnitude::parse("99999999999b");
        repo.forks = Some(u64::MAX);

        assert_eq!(repo.field(FieldKey::Stars), FieldValue::Number(i64::MAX));
        assert_eq!(repo.field(FieldKey::Forks), FieldValue::Number(i64::MAX));
    }

    #[test]
    fn test_with_summary_leaves_original_untouched() {
        let repo = Repository::new("a", "b", observed());
        let enriched = repo.with_summary("does things");
        assert_eq!(repo.summary, None);
        assert_eq!(enriched.field(FieldKey::Summary), FieldValue::Text("does things".into()));
    }

    #[test]
    fn test_emptiness_and_truthiness() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(!FieldValue::Number(0).is_empty());
        assert!(!FieldValue::Number(0).is_truthy());
        assert!(FieldValue::Text("x".into()).is_truthy());
    }

    #[test]
    fn test_key_ids_round_trip() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::from_id(key.id()), Some(key));
        }
        assert_eq!(FieldKey::from_id("nope"), None);
    }
}
