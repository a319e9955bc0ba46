use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::analytics::{bucket_count, DateRange, ExerciseFrequency, Granularity};
use crate::domain::{dates::parse_optional_date, MuscleGroup};
use crate::error::AppError;

/// Chart window used when `/stats/volume` is called without bounds.
pub const DEFAULT_VOLUME_WEEKS: i64 = 12;

/// Upper bound on the points of one volume chart, whatever the granularity.
pub const MAX_VOLUME_POINTS: u64 = 400;

#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeParams {
    pub fn bounds(&self) -> Result<(Option<Date>, Option<Date>), AppError> {
        Ok((
            parse_optional_date("from", self.from.as_deref())?,
            parse_optional_date("to", self.to.as_deref())?,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VolumeParams {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub granularity: Granularity,
}

impl VolumeParams {
    /// Missing `to` means today (UTC); missing `from` reaches back twelve weeks from `to`.
    pub fn range(&self) -> Result<DateRange, AppError> {
        let to = parse_optional_date("to", self.to.as_deref())?
            .unwrap_or_else(|| OffsetDateTime::now_utc().date());
        let from = match parse_optional_date("from", self.from.as_deref())? {
            Some(from) => from,
            None => to
                .checked_sub(Duration::weeks(DEFAULT_VOLUME_WEEKS))
                .unwrap_or(Date::MIN),
        };
        let range = DateRange::new(from, to);
        if bucket_count(range, self.granularity) > MAX_VOLUME_POINTS {
            return Err(AppError::validation(
                "from",
                format!(
                    "Range too long: at most {} points per chart, use a coarser granularity",
                    MAX_VOLUME_POINTS
                ),
            ));
        }
        Ok(range)
    }
}

#[derive(Debug, Serialize)]
pub struct FrequencyReport {
    pub exercises: Vec<ExerciseFrequency>,
    pub muscle_groups: BTreeMap<MuscleGroup, u32>,
}
