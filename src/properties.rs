//! Column-type-specific property payloads.
//!
//! Turns a repository into the `properties` object the store expects, one
//! entry per mapped column. Values that do not fit a column's type are
//! dropped for that record rather than reported.

use serde_json::{json, Map, Value};

use crate::repository::{FieldKey, FieldValue, Repository};
use crate::schema::{ColumnKind, FieldMapping, Schema, SchemaColumn};

/// Column name → wire payload.
pub type Payload = Map<String, Value>;

/// Longest text written to title and text columns.
pub const MAX_TEXT_CHARS: usize = 2000;

/// Longest value considered for a single-choice column.
pub const MAX_CHOICE_CHARS: usize = 100;

/// Most entries written to a multi-choice column.
pub const MAX_MULTI_CHOICES: usize = 10;

/// Build the property payload for one repository.
///
/// An empty result means nothing in the record fits the schema; the caller
/// treats that as a failed write.
pub fn serialize(repo: &Repository, mapping: &FieldMapping, schema: &Schema) -> Payload {
    let mut payload = Payload::new();

    for (key, column_name) in mapping.iter() {
        let Some(column) = schema.get(column_name) else {
            continue;
        };
        let value = repo.field(key);
        if value.is_empty() && !key.always_present() {
            continue;
        }
        if let Some(property) = property_value(column, key, &value) {
            payload.insert(column.name.clone(), property);
        }
    }

    payload
}

/// Wire value for one column, or `None` when the value does not fit.
pub fn property_value(column: &SchemaColumn, key: FieldKey, value: &FieldValue) -> Option<Value> {
    match column.kind {
        ColumnKind::Title => Some(json!({ "title": [text_block(value)] })),
        ColumnKind::Text => Some(json!({ "rich_text": [text_block(value)] })),
        ColumnKind::Number => match value {
            FieldValue::Number(n) => Some(json!({ "number": n })),
            _ => None,
        },
        ColumnKind::Url => Some(json!({ "url": value.to_string() })),
        ColumnKind::Date => match value {
            FieldValue::Text(s) if s.chars().count() >= 10 => Some(json!({ "date": { "start": s } })),
            _ => None,
        },
        ColumnKind::Email => {
            let s = value.to_string();
            s.contains('@').then(|| json!({ "email": s }))
        }
        ColumnKind::Phone => Some(json!({ "phone_number": value.to_string() })),
        ColumnKind::Boolean => Some(json!({ "checkbox": value.is_truthy() })),
        ColumnKind::MultiChoice => {
            let entries: Vec<Value> = choice_entries(value)
                .into_iter()
                .take(MAX_MULTI_CHOICES)
                .map(|name| json!({ "name": name }))
                .collect();
            // unknown options are passed through; the store decides
            (!entries.is_empty()).then(|| json!({ "multi_select": entries }))
        }
        ColumnKind::SingleChoice => {
            let candidate = truncate(&value.to_string(), MAX_CHOICE_CHARS);
            if candidate.is_empty() || !column.choices.contains(&candidate) {
                tracing::debug!(key = key.id(), column = %column.name, "value not among known choices");
                return None;
            }
            Some(json!({ "select": { "name": candidate } }))
        }
        ColumnKind::Unknown => None,
    }
}

fn text_block(value: &FieldValue) -> Value {
    json!({ "text": { "content": truncate(&value.to_string(), MAX_TEXT_CHARS) } })
}

fn choice_entries(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::List(items) => items.iter().filter(|s| !s.is_empty()).cloned().collect(),
        FieldValue::Null => Vec::new(),
        other => {
            let s = other.to_string();
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
    }
}

/// Truncate to at most `max` characters (not bytes).
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
