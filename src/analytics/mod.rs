//! Derived metrics over a user's sessions. Pure, synchronous, never fails.

mod frequency;
mod records;
mod timeline;
mod volume;

pub use frequency::{exercise_frequency, muscle_group_frequency, ExerciseFrequency};
pub use records::{exercise_progress, personal_records, PersonalRecords, ProgressPoint};
pub use timeline::{
    bucket_count, bucket_start, volume_over_time, DateRange, Granularity, VolumePoint,
};
pub use volume::{entry_volume, session_volume, set_volume, summarize, TrainingSummary};
