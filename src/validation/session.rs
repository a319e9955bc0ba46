use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;
use validator::Validate;

use super::{clean_text, field_errors};
use crate::domain::{
    dates::iso_date, ExerciseEntry, SessionDraft, SessionPatch, SetEntry,
};
use crate::error::{AppError, FieldError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SetInput {
    #[validate(range(min = 1, max = 10000, message = "Reps must be a positive whole number"))]
    pub reps: Option<i64>,
    #[validate(range(min = 0.0, max = 10000.0, message = "Weight must be between 0 and 10000"))]
    pub weight: Option<f64>,
    #[validate(range(min = 1, max = 10, message = "RPE must be between 1 and 10"))]
    pub rpe: Option<i64>,
    #[validate(range(min = 0.0, max = 100000.0, message = "Distance must be a non-negative number"))]
    pub distance: Option<f64>,
    #[validate(range(min = 1, max = 86400, message = "Time must be a positive number of seconds"))]
    pub time_seconds: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExerciseInput {
    pub workout_type_id: Uuid,
    /// Optional; the stored name is refreshed from the workout type.
    #[serde(default)]
    pub workout_type_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Add at least one set"))]
    #[validate(nested)]
    pub sets: Vec<SetInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionInput {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[validate(range(min = 1, max = 1440, message = "Duration must be a positive number of minutes"))]
    pub duration_minutes: i64,
    #[serde(default)]
    #[validate(nested)]
    pub exercises: Vec<ExerciseInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SessionPatchInput {
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be a positive number of minutes"))]
    pub duration_minutes: Option<i64>,
    pub exercises: Option<Vec<ExerciseInput>>,
    /// An empty string clears the notes.
    pub notes: Option<String>,
}

// Range checks have already run, so the narrowing casts below cannot truncate.
impl From<SetInput> for SetEntry {
    fn from(s: SetInput) -> Self {
        SetEntry {
            reps: s.reps.map(|r| r as u32),
            weight: s.weight,
            rpe: s.rpe.map(|r| r as u8),
            distance: s.distance,
            time_seconds: s.time_seconds.map(|t| t as u32),
        }
    }
}

impl From<ExerciseInput> for ExerciseEntry {
    fn from(e: ExerciseInput) -> Self {
        ExerciseEntry {
            workout_type_id: e.workout_type_id,
            workout_type_name: clean_text(e.workout_type_name).unwrap_or_default(),
            sets: e.sets.into_iter().map(SetEntry::from).collect(),
            notes: clean_text(e.notes),
        }
    }
}

impl SessionInput {
    pub fn into_draft(self) -> Result<SessionDraft, AppError> {
        self.validate()?;
        Ok(SessionDraft {
            date: self.date,
            duration_minutes: self.duration_minutes as u32,
            exercises: self.exercises.into_iter().map(ExerciseEntry::from).collect(),
            notes: clean_text(self.notes),
        })
    }
}

impl SessionPatchInput {
    pub fn into_patch(self) -> Result<SessionPatch, AppError> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };
        for (index, exercise) in self.exercises.iter().flatten().enumerate() {
            if let Err(e) = exercise.validate() {
                errors.extend(field_errors(&e).into_iter().map(|f| {
                    FieldError::new(format!("exercises[{}].{}", index, f.field), f.message)
                }));
            }
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(SessionPatch {
            date: self.date,
            duration_minutes: self.duration_minutes.map(|d| d as u32),
            exercises: self
                .exercises
                .map(|list| list.into_iter().map(ExerciseEntry::from).collect()),
            notes: self.notes.map(|n| clean_text(Some(n))),
        })
    }
}
