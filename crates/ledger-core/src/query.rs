//! # List Queries
//!
//! Parameters shared by every admin list view: a substring search term, a
//! date range and paging. Entity-specific filters (truck status, customer
//! kind, ...) are passed next to a `ListQuery` by the repositories.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ledger_core::ListQuery;
//!
//! let october = ListQuery::new()
//!     .search("maize")
//!     .between(
//!         NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2026, 10, 31).unwrap(),
//!     )
//!     .limit(50);
//!
//! assert_eq!(october.search_pattern().as_deref(), Some("%maize%"));
//! assert_eq!(october.effective_limit(), 50);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_period, validate_search_query};

/// Rows returned when no limit is given.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Hard cap on rows per page.
pub const MAX_LIST_LIMIT: u32 = 500;

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive date range; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "Option<String>")]
    pub from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Inclusive money range, used by the product price filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MoneyRange {
    pub min: Option<Money>,
    pub max: Option<Money>,
}

// =============================================================================
// List Query
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ListQuery {
    /// Case-insensitive substring matched against the view's search fields.
    pub search: Option<String>,
    /// Applied to the view's date column, if it has one.
    #[serde(default)]
    pub dates: DateRange,
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn since(mut self, from: NaiveDate) -> Self {
        self.dates.from = Some(from);
        self
    }

    pub fn until(mut self, to: NaiveDate) -> Self {
        self.dates.to = Some(to);
        self
    }

    pub fn between(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.since(from).until(to)
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Limit clamped to `1..=MAX_LIST_LIMIT`.
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }

    /// Escaped `LIKE` pattern for the search term, `None` when blank.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(like_pattern)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(term) = &self.search {
            validate_search_query(term)?;
        }
        if let (Some(from), Some(to)) = (self.dates.from, self.dates.to) {
            validate_period("dates", from, to)?;
        }
        Ok(())
    }
}

/// Wraps a term in `%…%`, escaping `\`, `%` and `_` so they match literally.
///
/// Pair with `ESCAPE '\'` in SQL.
///
/// ```rust
/// use ledger_core::query::like_pattern;
///
/// assert_eq!(like_pattern("50%"), "%50\\%%");
/// assert_eq!(like_pattern("ACH_1"), "%ACH\\_1%");
/// ```
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(ListQuery::new().effective_limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(ListQuery::new().limit(0).effective_limit(), 1);
        assert_eq!(ListQuery::new().limit(10_000).effective_limit(), MAX_LIST_LIMIT);
    }

    #[test]
    fn test_search_pattern() {
        assert_eq!(ListQuery::new().search_pattern(), None);
        assert_eq!(ListQuery::new().search("   ").search_pattern(), None);
        assert_eq!(
            ListQuery::new().search(" Dossou ").search_pattern().as_deref(),
            Some("%Dossou%")
        );
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("_x"), "%\\_x%");
    }

    #[test]
    fn test_date_range() {
        let range = DateRange {
            from: Some(date(1)),
            to: Some(date(15)),
        };
        assert!(range.contains(date(1)));
        assert!(range.contains(date(15)));
        assert!(!range.contains(date(16)));
        assert!(DateRange::default().is_unbounded());
        assert!(DateRange::default().contains(date(31)));
    }

    #[test]
    fn test_validate() {
        assert!(ListQuery::new().between(date(1), date(31)).validate().is_ok());
        assert!(matches!(
            ListQuery::new().between(date(31), date(1)).validate(),
            Err(ValidationError::InvalidPeriod { .. })
        ));
        assert!(ListQuery::new().search("x".repeat(101)).validate().is_err());
    }
}
