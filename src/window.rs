use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ReportError, Result};

/// One calendar month, from its first to its last instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
    next_month_first_day: NaiveDate,
}

impl MonthWindow {
    /// Window for the calendar month `date` falls in.
    pub fn containing(date: NaiveDate) -> Option<Self> {
        let first_day = first_day_of_month(date);
        let next_month_first_day = next_month_first_day(first_day)?;

        let start = first_day.and_time(NaiveTime::MIN);
        let end = next_month_first_day.and_time(NaiveTime::MIN) - Duration::milliseconds(1);

        Some(Self {
            start,
            end,
            next_month_first_day,
        })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn next_month_first_day(&self) -> NaiveDate {
        self.next_month_first_day
    }

    /// Full English month name, e.g. `March`.
    pub fn month_name(&self) -> String {
        self.start.format("%B").to_string()
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }
}

/// Overall reporting range, normalized to whole months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl MonthRange {
    /// Builds the range from optional month arguments. A missing bound
    /// defaults to the month containing `today`.
    pub fn from_args(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Result<Self> {
        let start_date = start.map(parse_month).transpose()?.unwrap_or(today);
        let end_date = end.map(parse_month).transpose()?.unwrap_or(today);

        let out_of_range =
            || ReportError::Config("Month is out of the supported range".to_string());
        let first = MonthWindow::containing(start_date).ok_or_else(out_of_range)?;
        let last = MonthWindow::containing(end_date).ok_or_else(out_of_range)?;

        if last.start() < first.start() {
            return Err(ReportError::Config(format!(
                "End month {} is before start month {}",
                last.start().format("%Y-%m"),
                first.start().format("%Y-%m")
            )));
        }

        Ok(Self {
            start: first.start(),
            end: last.end(),
        })
    }

    pub fn windows(&self) -> Vec<MonthWindow> {
        plan_windows(self.start, self.end)
    }
}

/// Accepts `yyyy-MM`, `yyyy-MM-dd`, `yyyy-MM-ddTHH:MM:SS` or RFC 3339.
pub fn parse_month(value: &str) -> Result<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Ok(date_time.date_naive());
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(date_time.date());
    }
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map_err(|e| ReportError::Config(format!("Invalid month '{value}': {e}")))
}

/// Whole calendar months from `start` to `end`; negative when `end` is earlier.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    #[allow(clippy::cast_possible_wrap)]
    let month_index = |date: NaiveDate| date.year() * 12 + date.month0() as i32;
    month_index(end) - month_index(start)
}

/// One window per calendar month in `[range_start, range_end]`, oldest first.
///
/// `range_start` must already be the first instant of its month.
pub fn plan_windows(range_start: NaiveDateTime, range_end: NaiveDateTime) -> Vec<MonthWindow> {
    let first_day = range_start.date();
    let count = months_between(first_day, range_end.date()) + 1;
    if count <= 0 {
        return Vec::new();
    }

    #[allow(clippy::cast_sign_loss)]
    let count = count as u32;

    (0..count)
        .map_while(|offset| {
            first_day
                .checked_add_months(Months::new(offset))
                .and_then(MonthWindow::containing)
        })
        .collect()
}

fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Pins the day to 1 before stepping, so Jan 31 lands on Feb 1 and never in March.
pub fn next_month_first_day(date: NaiveDate) -> Option<NaiveDate> {
    first_day_of_month(date).checked_add_months(Months::new(1))
}
