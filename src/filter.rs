use chrono::{DateTime, Datelike, Local, NaiveDate};

/// Jan 1 through Dec 31 of one calendar year, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    year: i32,
}

impl YearWindow {
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> String {
        format!("{}-01-01", self.year)
    }

    pub fn last_day(&self) -> String {
        format!("{}-12-31", self.year)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year
    }
}

/// What the record filter needs to know about a raw provider record.
pub trait Candidate {
    /// Completion (resolution or merge) date in the local calendar.
    fn completed_on(&self) -> Option<NaiveDate>;
    fn owner(&self) -> Option<&str>;
    fn is_completed(&self) -> bool;
    /// Name the scope predicate matches against, e.g. a repository.
    fn scope(&self) -> Option<&str> {
        None
    }
}

/// Accepts a record only when every predicate holds.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    window: YearWindow,
    owner: String,
    scope: Option<String>,
}

impl RecordFilter {
    pub fn new(window: YearWindow, owner: impl Into<String>) -> Self {
        Self {
            window,
            owner: owner.into(),
            scope: None,
        }
    }

    /// Also require the record's scope to contain `needle`, ignoring case.
    pub fn with_scope(mut self, needle: Option<String>) -> Self {
        self.scope = needle.map(|n| n.to_lowercase());
        self
    }

    pub fn accepts<C: Candidate>(&self, record: &C) -> bool {
        let in_window = record
            .completed_on()
            .is_some_and(|date| self.window.contains(date));
        let owned = record
            .owner()
            .is_some_and(|owner| owner.eq_ignore_ascii_case(&self.owner));
        let in_scope = match &self.scope {
            None => true,
            Some(needle) => record
                .scope()
                .is_some_and(|s| s.to_lowercase().contains(needle.as_str())),
        };
        in_window && owned && record.is_completed() && in_scope
    }
}

/// Parse a provider date into a local calendar date.
///
/// Accepts bare dates (`2024-03-15`), RFC 3339 (`2024-03-15T10:00:00Z`) and
/// Jira's offset format (`2024-03-15T10:00:00.000+0000`). Anything else is
/// `None`, which the filter treats as missing.
pub fn parse_completion_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}
