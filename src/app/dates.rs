//! Digest-date cursor.
//!
//! Tracks which day's digest is being viewed. Defaults to today;
//! moving back and forth steps whole days. URL persistence is the
//! host page's concern, so parsing is strict `YYYY-MM-DD` only.

use chrono::{Days, NaiveDate, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCursor {
    selected: NaiveDate,
}

impl DateCursor {
    /// Cursor positioned on today's digest.
    pub fn today() -> Self {
        Self {
            selected: Utc::now().date_naive(),
        }
    }

    pub fn at(date: NaiveDate) -> Self {
        Self { selected: date }
    }

    /// Parses a strict `YYYY-MM-DD` date, or falls back to today.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.and_then(parse_date) {
            Some(date) => Self::at(date),
            None => Self::today(),
        }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn is_today(&self) -> bool {
        self.selected == Utc::now().date_naive()
    }

    pub fn prev(&mut self) {
        if let Some(date) = self.selected.checked_sub_days(Days::new(1)) {
            self.selected = date;
        }
    }

    pub fn next(&mut self) {
        if let Some(date) = self.selected.checked_add_days(Days::new(1)) {
            self.selected = date;
        }
    }

    pub fn go_to_today(&mut self) {
        self.selected = Utc::now().date_naive();
    }
}

impl Default for DateCursor {
    fn default() -> Self {
        Self::today()
    }
}

/// Strict `YYYY-MM-DD` parse; anything else is rejected.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
