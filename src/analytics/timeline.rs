use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{util::days_in_year_month, Date, Duration};

use super::volume::session_volume;
use crate::domain::{dates::iso_date, WorkoutSession};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    #[default]
    Week,
    Month,
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePoint {
    #[serde(with = "iso_date")]
    pub bucket_start: Date,
    pub volume: f64,
    pub sessions: u32,
}

/// First day of the bucket containing `date`. Weeks start on Monday.
pub fn bucket_start(date: Date, granularity: Granularity) -> Date {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => date
            .checked_sub(Duration::days(i64::from(date.weekday().number_days_from_monday())))
            .unwrap_or(Date::MIN),
        Granularity::Month => date
            .checked_sub(Duration::days(i64::from(date.day()) - 1))
            .unwrap_or(Date::MIN),
    }
}

/// Number of points `volume_over_time` yields for `range`, computed without
/// materialising the buckets.
pub fn bucket_count(range: DateRange, granularity: Granularity) -> u64 {
    if range.start > range.end {
        return 0;
    }
    let first = bucket_start(range.start, granularity);
    let last = bucket_start(range.end, granularity);
    let count = match granularity {
        Granularity::Day => (last - first).whole_days() + 1,
        Granularity::Week => (last - first).whole_days() / 7 + 1,
        Granularity::Month => {
            i64::from(last.year() - first.year()) * 12
                + i64::from(u8::from(last.month()))
                - i64::from(u8::from(first.month()))
                + 1
        }
    };
    count.max(0) as u64
}

fn next_bucket(start: Date, granularity: Granularity) -> Option<Date> {
    let step = match granularity {
        Granularity::Day => 1,
        Granularity::Week => 7,
        Granularity::Month => i64::from(days_in_year_month(start.year(), start.month())),
    };
    start.checked_add(Duration::days(step))
}

/// Chart series: one point per calendar bucket overlapping `range`, oldest first,
/// with zero-valued points for empty buckets. Buckets are left-closed.
pub fn volume_over_time(
    sessions: &[WorkoutSession],
    range: DateRange,
    granularity: Granularity,
) -> Vec<VolumePoint> {
    if range.start > range.end {
        return Vec::new();
    }

    let mut buckets: BTreeMap<Date, (f64, u32)> = BTreeMap::new();
    let last = bucket_start(range.end, granularity);
    let mut cursor = Some(bucket_start(range.start, granularity));
    while let Some(start) = cursor.filter(|d| *d <= last) {
        buckets.insert(start, (0.0, 0));
        cursor = next_bucket(start, granularity);
    }

    for session in sessions.iter().filter(|s| range.contains(s.date)) {
        if let Some((volume, count)) = buckets.get_mut(&bucket_start(session.date, granularity)) {
            *volume += session_volume(session);
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(bucket_start, (volume, sessions))| VolumePoint {
            bucket_start,
            volume,
            sessions,
        })
        .collect()
}
