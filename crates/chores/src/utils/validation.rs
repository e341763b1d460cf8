//! Validation utilities.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ChoreError, ChoreResult};
use crate::utils::paths::EMAIL_KEY_PREFIX;

pub const MAX_COIN_VALUE: i64 = 10_000;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_NAME_LEN: usize = 80;
const MAX_SLUG_LEN: usize = 100;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex is valid")
});

/// Validation utilities
pub struct Validator;

impl Validator {
    /// Trims and lowercases an address, rejecting anything that does not
    /// look like an email.
    pub fn email(raw: &str) -> ChoreResult<String> {
        let email = raw.trim().to_lowercase();
        if email.len() > 254 || !EMAIL.is_match(&email) {
            return Err(ChoreError::InvalidEmail);
        }
        Ok(email)
    }

    /// Deterministic member document id for an invited address.
    pub fn email_key(email: &str) -> String {
        format!(
            "{EMAIL_KEY_PREFIX}{}",
            email.trim().to_lowercase().replace('/', "_")
        )
    }

    /// Trims descriptions and drops blank ones. Fails when none remain.
    pub fn descriptions(raw: &[String]) -> ChoreResult<Vec<String>> {
        let titles: Vec<String> = raw
            .iter()
            .map(|description| description.trim())
            .filter(|description| !description.is_empty())
            .map(|description| truncate(description, MAX_TITLE_LEN))
            .collect();

        if titles.is_empty() {
            return Err(ChoreError::DescriptionRequired);
        }
        Ok(titles)
    }

    pub fn coin_value(value: i64) -> ChoreResult<i64> {
        if !(0..=MAX_COIN_VALUE).contains(&value) {
            return Err(ChoreError::InvalidCoinValue {
                max: MAX_COIN_VALUE,
            });
        }
        Ok(value)
    }

    /// Parses an optional `YYYY-MM-DD` date. Blank input means no due date.
    pub fn due_date(raw: Option<&str>) -> ChoreResult<Option<String>> {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(None);
        };

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|date| Some(date.format("%Y-%m-%d").to_string()))
            .map_err(|_| ChoreError::InvalidDueDate)
    }

    /// Trimmed display name, or `None` when blank.
    pub fn name(raw: Option<&str>) -> Option<String> {
        raw.map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| truncate(name, MAX_NAME_LEN))
    }

    /// Document id for a chore title's usage counter.
    pub fn slug(title: &str) -> String {
        let mut slug = String::with_capacity(title.len());
        let mut pending_dash = false;

        for ch in title.trim().to_lowercase().chars() {
            if ch.is_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch);
            } else {
                pending_dash = true;
            }
        }

        let slug = truncate(&slug, MAX_SLUG_LEN);
        let slug = slug.trim_end_matches('-');
        if slug.is_empty() {
            "chore".to_string()
        } else {
            slug.to_string()
        }
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalised_and_validated() {
        assert_eq!(Validator::email("  Kid@Example.COM ").unwrap(), "kid@example.com");
        assert!(matches!(Validator::email("not-an-email"), Err(ChoreError::InvalidEmail)));
        assert!(matches!(Validator::email(""), Err(ChoreError::InvalidEmail)));
    }

    #[test]
    fn email_key_replaces_path_separators() {
        assert_eq!(Validator::email_key(" A/B@Example.com"), "email:a_b@example.com");
    }

    #[test]
    fn descriptions_drop_blanks() {
        let titles =
            Validator::descriptions(&["  Dishes ".into(), "   ".into(), "Laundry".into()]).unwrap();
        assert_eq!(titles, vec!["Dishes", "Laundry"]);
        assert!(matches!(
            Validator::descriptions(&[" ".into(), String::new()]),
            Err(ChoreError::DescriptionRequired)
        ));
        assert!(matches!(
            Validator::descriptions(&[]),
            Err(ChoreError::DescriptionRequired)
        ));
    }

    #[test]
    fn coin_value_bounds() {
        assert_eq!(Validator::coin_value(0).unwrap(), 0);
        assert_eq!(Validator::coin_value(MAX_COIN_VALUE).unwrap(), MAX_COIN_VALUE);
        assert!(Validator::coin_value(-1).is_err());
        assert!(Validator::coin_value(MAX_COIN_VALUE + 1).is_err());
    }

    #[test]
    fn due_dates_must_be_calendar_dates() {
        assert_eq!(Validator::due_date(Some("2024-02-29")).unwrap().as_deref(), Some("2024-02-29"));
        assert_eq!(Validator::due_date(Some("  ")).unwrap(), None);
        assert_eq!(Validator::due_date(None).unwrap(), None);
        assert!(Validator::due_date(Some("2023-02-29")).is_err());
        assert!(Validator::due_date(Some("tomorrow")).is_err());
    }

    #[test]
    fn slugs_collapse_punctuation() {
        assert_eq!(Validator::slug("  Feed the Cat!! "), "feed-the-cat");
        assert_eq!(Validator::slug("Take out / recycle"), "take-out-recycle");
        assert_eq!(Validator::slug("???"), "chore");
    }
}
