//! Human-readable count parsing ("1.2k", "3M", "12,345").

use regex::Regex;
use std::sync::OnceLock;

fn magnitude_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d*\.?\d+)([kmb]?)").expect("valid magnitude regex"))
}

/// Parse a count with an optional `k`/`m`/`b` suffix.
///
/// Thousands separators and whitespace are ignored, fractional results are
/// truncated toward zero, and text without a numeric mantissa yields `0`.
pub fn parse(text: &str) -> u64 {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let Some(caps) = magnitude_re().captures(&cleaned) else {
        return 0;
    };

    let mantissa: f64 = match caps[1].parse() {
        Ok(value) => value,
        Err(_) => return 0,
    };
    let multiplier = match &caps[2] {
        "k" => 1e3,
        "m" => 1e6,
        "b" => 1e9,
        _ => 1.0,
    };

    // float-to-int `as` truncates and saturates
    (mantissa * multiplier).trunc() as u64
}
