// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Day bucketing, daily totals and streaks.
//!
//! Everything here is recomputed from the full entry list on each call.
//! Histories are single-user and small, so nothing is cached.

use crate::models::{DailyPoint, TrackedEntry};
use crate::time_utils::{days_before, local_day, previous_day};
use chrono::{NaiveDate, TimeZone};
use std::collections::BTreeMap;

/// Entries grouped by the local calendar day they fall on.
///
/// Only days with at least one entry have a key. Within a bucket, entries
/// keep the order they had in the input.
pub type DayBuckets<'a, E> = BTreeMap<NaiveDate, Vec<&'a E>>;

/// Errors from progress calculations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("Calendar arithmetic out of range before {0}")]
    CalendarOutOfRange(NaiveDate),
}

/// Group entries by local calendar day in `tz`.
pub fn day_buckets<'a, E, Tz>(entries: &'a [E], tz: &Tz) -> DayBuckets<'a, E>
where
    E: TrackedEntry,
    Tz: TimeZone,
{
    let mut buckets: DayBuckets<'a, E> = BTreeMap::new();
    for entry in entries {
        buckets
            .entry(local_day(entry.timestamp(), tz))
            .or_default()
            .push(entry);
    }
    buckets
}

/// Sum of quantities. No validation: negative values are summed as-is.
pub fn daily_total<'a, E, I>(entries: I) -> f64
where
    E: TrackedEntry + 'a,
    I: IntoIterator<Item = &'a E>,
{
    entries.into_iter().map(|e| e.quantity()).sum()
}

/// Total for a single day of a bucket map (0 when the day has no entries).
pub fn total_on<E: TrackedEntry>(buckets: &DayBuckets<'_, E>, day: NaiveDate) -> f64 {
    buckets
        .get(&day)
        .map(|bucket| daily_total(bucket.iter().copied()))
        .unwrap_or(0.0)
}

/// Consecutive days whose total reaches `goal`, counted back from `today`.
///
/// The walk starts at yesterday and stops at the first day that is below
/// the goal or has no entries at all. Today is checked on its own and adds
/// one when it already qualifies, so an unfinished today never breaks the
/// streak.
pub fn streak<E, Tz>(
    entries: &[E],
    goal: f64,
    today: NaiveDate,
    tz: &Tz,
) -> Result<u32, ProgressError>
where
    E: TrackedEntry,
    Tz: TimeZone,
{
    let buckets = day_buckets(entries, tz);
    streak_from_buckets(&buckets, goal, today)
}

/// Same as [`streak`], for callers that already built the buckets.
pub fn streak_from_buckets<E: TrackedEntry>(
    buckets: &DayBuckets<'_, E>,
    goal: f64,
    today: NaiveDate,
) -> Result<u32, ProgressError> {
    let mut count = 0;
    let mut day = previous_day(today).ok_or(ProgressError::CalendarOutOfRange(today))?;

    while total_on(buckets, day) >= goal {
        count += 1;
        day = previous_day(day).ok_or(ProgressError::CalendarOutOfRange(day))?;
    }

    if total_on(buckets, today) >= goal {
        count += 1;
    }

    Ok(count)
}

/// One zero-filled point per day for the `days` days ending at `end_day`,
/// oldest first.
pub fn daily_series<E, Tz>(
    entries: &[E],
    goal: f64,
    end_day: NaiveDate,
    days: u32,
    tz: &Tz,
) -> Result<Vec<DailyPoint>, ProgressError>
where
    E: TrackedEntry,
    Tz: TimeZone,
{
    let buckets = day_buckets(entries, tz);
    (0..days)
        .rev()
        .map(|offset| {
            let day =
                days_before(end_day, offset).ok_or(ProgressError::CalendarOutOfRange(end_day))?;
            let total = total_on(&buckets, day);
            Ok(DailyPoint {
                date: day.format("%Y-%m-%d").to_string(),
                total,
                goal_met: total >= goal,
            })
        })
        .collect()
}

/// Entries newest first, for history lists. Ties keep input order.
pub fn history<E: TrackedEntry>(entries: &[E]) -> Vec<&E> {
    let mut sorted: Vec<&E> = entries.iter().collect();
    sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HydrationEntry;
    use chrono::{DateTime, Duration, FixedOffset, Utc};

    const GOAL: f64 = 60.0;

    fn at(ts: DateTime<Utc>, ounces: f64, id: &str) -> HydrationEntry {
        HydrationEntry {
            id: id.to_string(),
            hydration_ounces: ounces,
            timestamp: ts,
        }
    }

    fn noon(day: NaiveDate) -> DateTime<Utc> {
        day.and_hms_opt(12, 0, 0).unwrap().and_utc()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn days_ago(n: u32) -> NaiveDate {
        days_before(today(), n).unwrap()
    }

    #[test]
    fn test_buckets_empty() {
        let entries: Vec<HydrationEntry> = vec![];
        assert!(day_buckets(&entries, &Utc).is_empty());
        assert_eq!(daily_total(&entries), 0.0);
    }

    #[test]
    fn test_buckets_group_by_local_day() {
        let pacific = FixedOffset::west_opt(7 * 3600).unwrap();
        // 02:00 UTC on the 15th is the evening of the 14th in UTC-7.
        let late = today().and_hms_opt(2, 0, 0).unwrap().and_utc();
        let entries = vec![at(late, 8.0, "a"), at(noon(today()), 8.0, "b")];

        let utc_buckets = day_buckets(&entries, &Utc);
        assert_eq!(utc_buckets.len(), 1);
        assert_eq!(utc_buckets[&today()].len(), 2);

        let local_buckets = day_buckets(&entries, &pacific);
        assert_eq!(local_buckets.len(), 2);
        assert_eq!(local_buckets[&days_ago(1)][0].id, "a");
        assert_eq!(local_buckets[&today()][0].id, "b");
    }

    #[test]
    fn test_buckets_keep_input_order_for_equal_timestamps() {
        let ts = noon(today());
        let entries = vec![at(ts, 1.0, "first"), at(ts, 2.0, "second"), at(ts, 3.0, "third")];

        let buckets = day_buckets(&entries, &Utc);
        let ids: Vec<&str> = buckets[&today()].iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_bucket_totals_sum_to_overall_total() {
        let entries: Vec<HydrationEntry> = (0..20)
            .map(|i| at(noon(today()) - Duration::hours(i * 7), (i as f64) * 1.5, "x"))
            .collect();

        let buckets = day_buckets(&entries, &Utc);
        let bucketed: f64 = buckets
            .values()
            .map(|b| daily_total(b.iter().copied()))
            .sum();
        let overall: f64 = entries.iter().map(|e| e.hydration_ounces).sum();

        assert!((bucketed - overall).abs() < 1e-9);
        assert_eq!(buckets.values().map(Vec::len).sum::<usize>(), entries.len());
    }

    #[test]
    fn test_daily_total_does_not_validate() {
        let entries = vec![at(noon(today()), 10.0, "a"), at(noon(today()), -3.0, "b")];
        assert_eq!(daily_total(&entries), 7.0);
    }

    #[test]
    fn test_streak_empty_history() {
        let entries: Vec<HydrationEntry> = vec![];
        assert_eq!(streak(&entries, GOAL, today(), &Utc), Ok(0));
    }

    #[test]
    fn test_streak_counts_consecutive_days_before_today() {
        let entries = vec![
            at(noon(days_ago(1)), 60.0, "a"),
            at(noon(days_ago(2)), 30.0, "b"),
            at(noon(days_ago(2)), 30.0, "c"),
            at(noon(days_ago(3)), 75.0, "d"),
        ];
        // Today not met yet: streak is still credited for the previous days.
        assert_eq!(streak(&entries, GOAL, today(), &Utc), Ok(3));
    }

    #[test]
    fn test_streak_adds_today_when_met() {
        let mut entries = vec![at(noon(days_ago(1)), 60.0, "a")];
        assert_eq!(streak(&entries, GOAL, today(), &Utc), Ok(1));

        entries.push(at(noon(today()), 59.0, "b"));
        assert_eq!(streak(&entries, GOAL, today(), &Utc), Ok(1));

        entries.push(at(noon(today()), 1.0, "c"));
        assert_eq!(streak(&entries, GOAL, today(), &Utc), Ok(2));

        // Further logging on an already-qualifying today adds nothing.
        entries.push(at(noon(today()), 40.0, "d"));
        assert_eq!(streak(&entries, GOAL, today(), &Utc), Ok(2));
    }

    #[test]
    fn test_streak_gap_breaks_walk() {
        let entries = vec![at(noon(today()), 60.0, "a"), at(noon(days_ago(2)), 60.0, "b")];
        assert_eq!(streak(&entries, GOAL, today(), &Utc), Ok(1));
    }

    #[test]
    fn test_streak_below_goal_day_breaks_walk_like_empty_day() {
        let entries = vec![
            at(noon(days_ago(1)), 60.0, "a"),
            at(noon(days_ago(2)), 10.0, "b"),
            at(noon(days_ago(3)), 60.0, "c"),
        ];
        assert_eq!(streak(&entries, GOAL, today(), &Utc), Ok(1));
    }

    #[test]
    fn test_streak_ignores_future_days() {
        let tomorrow = today().succ_opt().unwrap();
        let entries = vec![at(noon(tomorrow), 100.0, "a")];
        assert_eq!(streak(&entries, GOAL, today(), &Utc), Ok(0));
    }

    #[test]
    fn test_streak_calendar_overflow_is_an_error() {
        let entries: Vec<HydrationEntry> = vec![];
        assert_eq!(
            streak(&entries, GOAL, NaiveDate::MIN, &Utc),
            Err(ProgressError::CalendarOutOfRange(NaiveDate::MIN))
        );
    }

    #[test]
    fn test_daily_series_zero_fills() {
        let entries = vec![
            at(noon(today()), 20.0, "a"),
            at(noon(days_ago(2)), 60.0, "b"),
        ];

        let series = daily_series(&entries, GOAL, today(), 3, &Utc).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].date, "2024-06-13");
        assert_eq!(series[0].total, 60.0);
        assert!(series[0].goal_met);
        assert_eq!(series[1].total, 0.0);
        assert!(!series[1].goal_met);
        assert_eq!(series[2].date, "2024-06-15");
        assert_eq!(series[2].total, 20.0);
    }

    #[test]
    fn test_history_newest_first() {
        let entries = vec![
            at(noon(days_ago(2)), 1.0, "old"),
            at(noon(today()), 1.0, "new"),
            at(noon(days_ago(1)), 1.0, "mid"),
        ];

        let ids: Vec<&str> = history(&entries).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }
}
