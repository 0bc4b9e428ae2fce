//! Target schema discovered at runtime.
//!
//! "Do X": Describe the columns of the target database.
//!
//! A `Schema` is fetched once per run and read-only afterwards. Column order
//! is preserved as delivered by the store; matching walks columns in that
//! order.

pub mod matcher;

pub use matcher::{match_fields, validate, CandidateLabels, FieldMapping, SIMILARITY_THRESHOLD};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Column types the serializer knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnKind {
    Title,
    Text,
    Number,
    Url,
    Date,
    Email,
    Phone,
    Boolean,
    SingleChoice,
    MultiChoice,
    Unknown,
}

impl ColumnKind {
    pub fn is_choice(self) -> bool {
        matches!(self, ColumnKind::SingleChoice | ColumnKind::MultiChoice)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Title => "title",
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Url => "url",
            ColumnKind::Date => "date",
            ColumnKind::Email => "email",
            ColumnKind::Phone => "phone",
            ColumnKind::Boolean => "boolean",
            ColumnKind::SingleChoice => "single-choice",
            ColumnKind::MultiChoice => "multi-choice",
            ColumnKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One named, typed slot in the target record shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    pub kind: ColumnKind,
    /// Known options; only populated for choice kinds.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub choices: BTreeSet<String>,
}

impl SchemaColumn {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            choices: BTreeSet::new(),
        }
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.kind.is_choice() {
            self.choices = choices.into_iter().map(Into::into).collect();
        }
        self
    }
}

/// Column name → column, in store order. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Human title of the database, when the store reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    columns: Vec<SchemaColumn>,
}

impl Schema {
    pub fn new(columns: impl IntoIterator<Item = SchemaColumn>) -> Self {
        let mut schema = Self::default();
        for column in columns {
            schema.insert(column);
        }
        schema
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Insert a column, replacing any existing column of the same name.
    pub fn insert(&mut self, column: SchemaColumn) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &SchemaColumn> {
        self.columns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
