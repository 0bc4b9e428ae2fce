//! GitHub trending page as the listing source.
//!
//! "Do X": Fetch the raw trending document for a period.
//!
//! All HTTP interaction hidden in internal.rs.

mod internal;

pub use internal::TrendingClient;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Public trending page.
pub const DEFAULT_TRENDING_URL: &str = "https://github.com/trending";

/// Trending window offered by the listing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    /// Value of the `since` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            other => anyhow::bail!("unknown trending period `{}` (daily, weekly, monthly)", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse() {
        assert_eq!("daily".parse::<Period>().unwrap(), Period::Daily);
        assert_eq!(" Weekly ".parse::<Period>().unwrap(), Period::Weekly);
        assert!("yearly".parse::<Period>().is_err());
    }
}
