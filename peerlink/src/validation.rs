//! Request field validation
//!
//! Collects every violation of a request before failing, so a form can show
//! all of its errors at once.

use bson::DateTime;
use chrono::{NaiveDate, Utc};
use peerlink_client::FieldViolation;

use crate::types::{PeerlinkError, Result};

#[derive(Debug, Default)]
pub struct Violations {
    list: Vec<FieldViolation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, param: &str, msg: &str) {
        self.list.push(FieldViolation::new(param, msg));
    }

    /// Record `msg` against `param` when the value is missing or blank
    pub fn require(&mut self, param: &str, value: Option<&str>, msg: &str) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.push(param, msg);
        }
    }

    pub fn check(&mut self, param: &str, ok: bool, msg: &str) {
        if !ok {
            self.push(param, msg);
        }
    }

    /// Parse an optional date field, recording a violation if it is present but unreadable
    pub fn date(&mut self, param: &str, value: Option<&str>) -> Option<DateTime> {
        let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
        match parse_date(raw) {
            Some(date) => Some(date),
            None => {
                self.push(param, &format!("{param} is not a valid date"));
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn finish(self) -> Result<()> {
        if self.list.is_empty() {
            Ok(())
        } else {
            Err(PeerlinkError::Validation(self.list))
        }
    }
}

/// Accepts `YYYY-MM-DD` (form date inputs) or RFC 3339.
pub fn parse_date(raw: &str) -> Option<DateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
        return Some(DateTime::from_chrono(midnight));
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| DateTime::from_chrono(dt.with_timezone(&Utc)))
}

/// Loose shape check: something@domain.tld
pub fn is_email(raw: &str) -> bool {
    let raw = raw.trim();
    match raw.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
                && !raw.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Trimmed value, or None when blank
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
