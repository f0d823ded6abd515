//! Report period

use crate::errors::DeskError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reporting granularity of a requested report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Weekly,
    Monthly,
    /// A calendar year, always written with exactly four digits
    Yearly { year: u16 },
}

impl Period {
    /// Stable token used in storage keys and file names
    pub fn slug(&self) -> String {
        match self {
            Period::Weekly => "weekly".to_string(),
            Period::Monthly => "monthly".to_string(),
            Period::Yearly { year } => format!("{:04}", year),
        }
    }

    /// Inverse of [`Period::slug`]
    pub fn from_slug(slug: &str) -> Option<Self> {
        slug.parse().ok()
    }
}

impl FromStr for Period {
    type Err = DeskError;

    /// `weekly` / `monthly` in any case, or exactly four ASCII digits.
    ///
    /// `20245`, `24`, `+2024` and `２０２４` (full-width digits) are rejected.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let field = raw.trim();
        if field.eq_ignore_ascii_case("weekly") {
            return Ok(Period::Weekly);
        }
        if field.eq_ignore_ascii_case("monthly") {
            return Ok(Period::Monthly);
        }
        if field.len() == 4 && field.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(year) = field.parse::<u16>() {
                return Ok(Period::Yearly { year });
            }
        }
        Err(DeskError::InvalidPeriod {
            raw: field.to_string(),
        })
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.slug())
    }
}
