//! Semantic key → schema column matching.
//!
//! Pure function over (schema, ordered keys, candidate labels). Each key
//! claims at most one column and each column is claimed at most once, so no
//! write ever fills the same column twice.

use std::collections::{BTreeMap, HashMap, HashSet};

use difflib::sequencematcher::SequenceMatcher;
use tracing::debug;

use super::Schema;
use crate::error::SyncError;
use crate::repository::FieldKey;

/// Minimum similarity (0..=1) for a fuzzy match to be accepted.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Per-key list of column labels that count as an exact match.
#[derive(Debug, Clone)]
pub struct CandidateLabels {
    labels: HashMap<FieldKey, Vec<String>>,
}

impl Default for CandidateLabels {
    fn default() -> Self {
        let labels = FieldKey::ALL
            .iter()
            .map(|key| (*key, key.labels().iter().map(|l| l.to_string()).collect()))
            .collect();
        Self { labels }
    }
}

impl CandidateLabels {
    /// Labels with nothing registered for any key.
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Append extra labels for a key (after the built-in ones).
    pub fn add(&mut self, key: FieldKey, labels: impl IntoIterator<Item = impl Into<String>>) {
        self.labels
            .entry(key)
            .or_default()
            .extend(labels.into_iter().map(Into::into));
    }

    /// Built-in labels plus aliases keyed by semantic key id.
    ///
    /// Unknown ids are reported back so callers can warn about typos.
    pub fn with_aliases(aliases: &BTreeMap<String, Vec<String>>) -> (Self, Vec<String>) {
        let mut labels = Self::default();
        let mut unknown = Vec::new();
        for (id, extra) in aliases {
            match FieldKey::from_id(id) {
                Some(key) => labels.add(key, extra.iter().cloned()),
                None => unknown.push(id.clone()),
            }
        }
        (labels, unknown)
    }

    pub fn for_key(&self, key: FieldKey) -> &[String] {
        self.labels.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Semantic key → column name. Injective: no column appears twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMapping {
    entries: Vec<(FieldKey, String)>,
}

impl FieldMapping {
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, column)| column.as_str())
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.get(key).is_some()
    }

    /// Mapped pairs in matching order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.entries.iter().map(|(k, c)| (*k, c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn claim(&mut self, key: FieldKey, column: &str) {
        self.entries.push((key, column.to_string()));
    }
}

/// Case-insensitive Ratcliff/Obershelp ratio between a key id and a column name.
///
/// `2 * M / (len(a) + len(b))` over characters, where `M` counts characters in
/// matching blocks. The column name is the first sequence, as in
/// `difflib::get_close_matches`.
pub fn similarity(key_id: &str, column: &str) -> f64 {
    let key: Vec<char> = key_id.to_lowercase().chars().collect();
    let name: Vec<char> = column.to_lowercase().chars().collect();
    if key.is_empty() && name.is_empty() {
        return 1.0;
    }
    let mut matcher = SequenceMatcher::new(name.as_slice(), key.as_slice());
    f64::from(matcher.ratio())
}

/// Match each key, in order, to an unclaimed schema column.
///
/// Precedence per key: case-insensitive exact match against the key's
/// labels, then the single most similar column name if it reaches
/// [`SIMILARITY_THRESHOLD`]. Equal scores go to the lexically greatest
/// lowercased name, the order `get_close_matches(n=1)` picks.
pub fn match_fields(schema: &Schema, keys: &[FieldKey], candidates: &CandidateLabels) -> FieldMapping {
    let mut mapping = FieldMapping::default();
    let mut claimed: HashSet<&str> = HashSet::new();

    for &key in keys {
        let available: Vec<&str> = schema.names().filter(|n| !claimed.contains(n)).collect();

        let matched = exact_match(&available, candidates.for_key(key))
            .or_else(|| fuzzy_match(&available, key.id()));

        match matched {
            Some(column) => {
                debug!(key = key.id(), column, "matched field");
                mapping.claim(key, column);
                claimed.insert(column);
            }
            None => debug!(key = key.id(), "no matching column"),
        }
    }

    mapping
}

fn exact_match<'a>(available: &[&'a str], labels: &[String]) -> Option<&'a str> {
    let lowered: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    available
        .iter()
        .copied()
        .find(|name| lowered.contains(&name.to_lowercase()))
}

fn fuzzy_match<'a>(available: &[&'a str], key_id: &str) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for &name in available {
        let score = similarity(key_id, name);
        if score < SIMILARITY_THRESHOLD {
            continue;
        }
        let better = match best {
            None => true,
            Some((top_name, top)) => {
                score > top || (score == top && name.to_lowercase() > top_name.to_lowercase())
            }
        };
        if better {
            best = Some((name, score));
        }
    }
    best.map(|(name, _)| name)
}

/// The title key is mandatory; everything else may stay unmapped.
pub fn validate(mapping: &FieldMapping) -> Result<(), SyncError> {
    if mapping.contains(FieldKey::Name) {
        Ok(())
    } else {
        Err(SyncError::MissingRequiredTitleField)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnKind, SchemaColumn};
    use approx::assert_relative_eq;

    fn schema(cols: &[(&str, ColumnKind)]) -> Schema {
        Schema::new(cols.iter().map(|(n, k)| SchemaColumn::new(*n, *k)))
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let schema = schema(&[("TITLE", ColumnKind::Title), ("Stars", ColumnKind::Number)]);
        let mapping = match_fields(&schema, &FieldKey::ALL, &CandidateLabels::default());

        assert_eq!(mapping.get(FieldKey::Name), Some("TITLE"));
        assert_eq!(mapping.get(FieldKey::Stars), Some("Stars"));
        assert!(validate(&mapping).is_ok());
    }

    #[test]
    fn test_shared_column_goes_to_first_key() {
        // "repo" is a label of both `name` and `full_name`
        let schema = schema(&[("Repo", ColumnKind::Title)]);
        let mapping = match_fields(
            &schema,
            &[FieldKey::Name, FieldKey::FullName],
            &CandidateLabels::default(),
        );

        assert_eq!(mapping.get(FieldKey::Name), Some("Repo"));
        assert_eq!(mapping.get(FieldKey::FullName), None);
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_fuzzy_fallback_above_threshold() {
        let schema = schema(&[("Forks Total", ColumnKind::Number)]);
        let mapping = match_fields(&schema, &[FieldKey::Forks], &CandidateLabels::empty());
        assert_eq!(mapping.get(FieldKey::Forks), Some("Forks Total"));
    }

    #[test]
    fn test_fuzzy_rejects_dissimilar_names() {
        let schema = schema(&[("Zzz", ColumnKind::Title)]);
        let mapping = match_fields(&schema, &FieldKey::ALL, &CandidateLabels::default());
        assert!(mapping.is_empty());
        assert!(matches!(
            validate(&mapping),
            Err(SyncError::MissingRequiredTitleField)
        ));
    }

    #[test]
    fn test_mapping_is_injective() {
        let schema = schema(&[
            ("Name", ColumnKind::Title),
            ("Repository", ColumnKind::Text),
            ("Link", ColumnKind::Url),
            ("Stars", ColumnKind::Number),
            ("Stars Today", ColumnKind::Number),
        ]);
        let mapping = match_fields(&schema, &FieldKey::ALL, &CandidateLabels::default());

        let mut seen = HashSet::new();
        for (_, column) in mapping.iter() {
            assert!(seen.insert(column), "column {} claimed twice", column);
        }
    }

    #[test]
    fn test_aliases_extend_labels() {
        let mut aliases = BTreeMap::new();
        aliases.insert("stars".to_string(), vec!["Popularity".to_string()]);
        aliases.insert("bogus".to_string(), vec!["x".to_string()]);

        let (labels, unknown) = CandidateLabels::with_aliases(&aliases);
        assert_eq!(unknown, vec!["bogus".to_string()]);

        let keys = [FieldKey::Name, FieldKey::Stars];
        let schema = schema(&[("Title", ColumnKind::Title), ("popularity", ColumnKind::Number)]);

        let plain = match_fields(&schema, &keys, &CandidateLabels::default());
        assert_eq!(plain.get(FieldKey::Stars), None);

        let mapping = match_fields(&schema, &keys, &labels);
        assert_eq!(mapping.get(FieldKey::Stars), Some("popularity"));
    }

    #[test]
    fn test_similarity_ignores_case() {
        assert_relative_eq!(similarity("stars", "STARS"), 1.0);
        assert_relative_eq!(similarity("name", "title"), 2.0 / 9.0, epsilon = 1e-6);
    }

    #[test]
    fn test_similarity_is_a_block_ratio() {
        assert_relative_eq!(similarity("name", "Nom"), 4.0 / 7.0, epsilon = 1e-6);
        assert_relative_eq!(similarity("owner", "Notes"), 0.4, epsilon = 1e-6);
        assert_relative_eq!(similarity("full_name", "Link"), 4.0 / 13.0, epsilon = 1e-6);
    }

    #[test]
    fn test_short_names_reach_threshold() {
        let nom = schema(&[("Nom", ColumnKind::Title), ("Stars", ColumnKind::Number)]);
        let mapping = match_fields(&nom, &FieldKey::ALL, &CandidateLabels::default());
        assert_eq!(mapping.get(FieldKey::Name), Some("Nom"));
        assert_eq!(mapping.get(FieldKey::Stars), Some("Stars"));
        assert!(validate(&mapping).is_ok());

        let notes = schema(&[("Notes", ColumnKind::Text)]);
        let mapping = match_fields(&notes, &[FieldKey::Owner], &CandidateLabels::default());
        assert_eq!(mapping.get(FieldKey::Owner), Some("Notes"));
    }

    #[test]
    fn test_earlier_key_can_take_a_later_keys_label() {
        // `full_name` scores 0.31 against "Link" and is tried before `url`
        let schema = schema(&[
            ("Title", ColumnKind::Title),
            ("Stars", ColumnKind::Number),
            ("Link", ColumnKind::Url),
        ]);
        let mapping = match_fields(&schema, &FieldKey::ALL, &CandidateLabels::default());

        assert_eq!(mapping.get(FieldKey::FullName), Some("Link"));
        assert_eq!(mapping.get(FieldKey::Url), None);
    }
}
