use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::dates::iso_date;

/// One logged set. Strength sets usually carry reps/weight/RPE, cardio sets
/// distance/time; none of the fields is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_seconds: Option<u32>,
}

impl SetEntry {
    pub fn strength(weight: f64, reps: u32) -> Self {
        Self {
            weight: Some(weight),
            reps: Some(reps),
            ..Self::default()
        }
    }

    pub fn cardio(distance: f64, time_seconds: u32) -> Self {
        Self {
            distance: Some(distance),
            time_seconds: Some(time_seconds),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub workout_type_id: Uuid,
    /// Name at the time of logging, kept so renamed or deleted types still display.
    pub workout_type_name: String,
    pub sets: Vec<SetEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub duration_minutes: u32,
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl WorkoutSession {
    pub fn includes_exercise(&self, workout_type_id: Uuid) -> bool {
        self.exercises
            .iter()
            .any(|e| e.workout_type_id == workout_type_id)
    }
}

/// A validated, normalised new session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDraft {
    pub date: Date,
    pub duration_minutes: u32,
    pub exercises: Vec<ExerciseEntry>,
    pub notes: Option<String>,
}

/// Partial update. `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub date: Option<Date>,
    pub duration_minutes: Option<u32>,
    pub exercises: Option<Vec<ExerciseEntry>>,
    pub notes: Option<Option<String>>,
}

impl SessionPatch {
    pub fn apply(self, target: &mut WorkoutSession) {
        if let Some(date) = self.date {
            target.date = date;
        }
        if let Some(duration) = self.duration_minutes {
            target.duration_minutes = duration;
        }
        if let Some(exercises) = self.exercises {
            target.exercises = exercises;
        }
        if let Some(notes) = self.notes {
            target.notes = notes;
        }
    }
}
