// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Shared helpers for date/time formatting and local calendar days.

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Calendar day an instant falls on in the given time zone.
pub fn local_day<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// The day before `day`, or `None` at the start of the representable calendar.
pub fn previous_day(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_sub_days(Days::new(1))
}

/// Step `count` days back from `day`.
pub fn days_before(day: NaiveDate, count: u32) -> Option<NaiveDate> {
    day.checked_sub_days(Days::new(u64::from(count)))
}
