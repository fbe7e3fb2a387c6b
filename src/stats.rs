use crate::models::{ClickSeries, SeriesPoint};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Minute,
    Hour,
    Day,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Minute, Granularity::Hour, Granularity::Day];

    /// Unrecognised names fall back to `Day`.
    pub fn parse_or_day(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "minute" => Granularity::Minute,
            "hour" => Granularity::Hour,
            _ => Granularity::Day,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
        }
    }

    fn truncate(self, at: NaiveDateTime) -> NaiveDateTime {
        let time = match self {
            Granularity::Minute => NaiveTime::from_hms_opt(at.hour(), at.minute(), 0),
            Granularity::Hour => NaiveTime::from_hms_opt(at.hour(), 0, 0),
            Granularity::Day => Some(NaiveTime::MIN),
        };
        at.date().and_time(time.unwrap_or(NaiveTime::MIN))
    }

    fn label(self, bucket: NaiveDateTime) -> String {
        match self {
            Granularity::Minute => bucket.format("%H:%M").to_string(),
            Granularity::Hour => bucket.format("%H:00").to_string(),
            Granularity::Day => bucket.format("%-m/%-d/%Y").to_string(),
        }
    }
}

pub fn aggregate<I, S>(timestamps: I, granularity: Granularity) -> ClickSeries
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    aggregate_in(timestamps, granularity, &Local)
}

/// Counts redirect timestamps per bucket, in the wall-clock time of `tz`.
///
/// Buckets are keyed by the full truncated timestamp, so the same hour on two
/// different days yields two points even though their labels match. Points
/// come out in chronological order. Unparseable timestamps are counted in
/// `skipped` and contribute to no bucket.
pub fn aggregate_in<I, S, Tz>(timestamps: I, granularity: Granularity, tz: &Tz) -> ClickSeries
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    Tz: TimeZone,
{
    let mut buckets: BTreeMap<NaiveDateTime, u64> = BTreeMap::new();
    let mut skipped = 0usize;

    for raw in timestamps {
        match parse_wall_clock(raw.as_ref(), tz) {
            Some(at) => {
                let count = buckets.entry(granularity.truncate(at)).or_default();
                *count = count.saturating_add(1);
            }
            None => skipped += 1,
        }
    }

    let points = buckets
        .into_iter()
        .map(|(bucket, clicks)| SeriesPoint {
            date: granularity.label(bucket),
            clicks,
            bucket: bucket.format("%Y-%m-%dT%H:%M:%S").to_string(),
        })
        .collect();

    ClickSeries { points, skipped }
}

/// Aggregates an optional stream; `None` behaves like an empty one.
pub fn aggregate_optional<S, Tz>(timestamps: Option<&[S]>, granularity: Granularity, tz: &Tz) -> ClickSeries
where
    S: AsRef<str>,
    Tz: TimeZone,
{
    match timestamps {
        Some(items) => aggregate_in(items.iter(), granularity, tz),
        None => ClickSeries::default(),
    }
}

/// Timestamps carrying an offset are converted into `tz`; naive ones are
/// taken to already be wall-clock time there.
fn parse_wall_clock<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(tz).naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(at);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}
