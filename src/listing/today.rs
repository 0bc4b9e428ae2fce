//! "Stars today" recovery.
//!
//! The daily delta is not consistently marked up, so it is recovered in three
//! tiers: a phrase search over the fragment text, then a scan of inline
//! labels, then zero. Known to miss some deltas; the field is supplementary.

use regex::Regex;
use std::sync::OnceLock;

use crate::magnitude;

fn phrase_patterns() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"(?i)(\d[\d,]*(?:\.\d+)?\s*[kmb]?)\s*stars?\s+today",
            r#"(?i)today[^"\d]*(\d[\d,]*)"#,
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid today pattern"))
        .collect()
    })
}

fn embedded_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\d[\d,]*(?:\.\d+)?[kmb]?").expect("valid number pattern"))
}

/// Best-effort star delta for one listing fragment.
///
/// `fragment_text` is the whole fragment's text, `labels` the text of each
/// inline label element, `total_stars` the already-extracted star count.
pub fn stars_today<'a>(
    fragment_text: &str,
    labels: impl IntoIterator<Item = &'a str>,
    total_stars: u64,
) -> u64 {
    if let Some(n) = from_phrase(fragment_text) {
        return n;
    }
    from_labels(labels, total_stars).unwrap_or(0)
}

fn from_phrase(text: &str) -> Option<u64> {
    phrase_patterns()
        .iter()
        .filter_map(|re| re.captures(text))
        .map(|caps| magnitude::parse(&caps[1]))
        .find(|n| *n > 0)
}

// A label number equal to or above the total is the total itself, not a delta.
// The number is read whole through `magnitude::parse`, so "1.2k" is 1200.
fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>, total_stars: u64) -> Option<u64> {
    labels.into_iter().find_map(|label| {
        let lowered = label.to_lowercase();
        if !lowered.contains("today") && !lowered.contains("star") {
            return None;
        }
        let n = magnitude::parse(embedded_number().find(&lowered)?.as_str());
        (n > 0 && n < total_stars).then_some(n)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_LABELS: [&str; 0] = [];

    #[test]
    fn test_phrase_tier() {
        let text = "Rust  12,345  1,234 \n\n stars today";
        assert_eq!(stars_today(text, NO_LABELS, 12345), 1234);
        assert_eq!(stars_today("1.5k stars today", NO_LABELS, 0), 1500);
        assert_eq!(stars_today("1 star today", NO_LABELS, 0), 1);
    }

    #[test]
    fn test_label_tier_requires_less_than_total() {
        let labels = ["Built by", "88 stars this week"];
        assert_eq!(stars_today("nothing here", labels, 500), 88);

        // equal to total means we read the total, not the delta
        assert_eq!(stars_today("nothing here", ["500 stars"], 500), 0);
    }

    #[test]
    fn test_phrase_tier_today_prefix() {
        assert_eq!(stars_today("Gained today: +37", NO_LABELS, 0), 37);
        assert_eq!(stars_today("Today 1,204 new", NO_LABELS, 0), 1204);

        // a quote ends the search for the number
        assert_eq!(stars_today(r#"today "label" 5"#, NO_LABELS, 0), 0);
    }

    #[test]
    fn test_label_tier_reads_whole_magnitude() {
        let labels = ["1.2k stars this week"];
        assert_eq!(stars_today("", labels, 50_000), 1200);
        assert_eq!(stars_today("", ["3,400 stars"], 50_000), 3400);
    }

    #[test]
    fn test_label_tier_skips_unrelated_labels() {
        let labels = ["42 forks", "Python"];
        assert_eq!(stars_today("", labels, 1000), 0);
    }

    #[test]
    fn test_defaults_to_zero() {
        assert_eq!(stars_today("", NO_LABELS, 10), 0);
    }
}
