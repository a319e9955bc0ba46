//! Typed records stored in the per-user document collections.

pub mod dates;
mod profile;
mod session;
mod workout_type;

pub use profile::{ProfilePatch, UserProfile, WeightUnit};
pub use session::{ExerciseEntry, SessionDraft, SessionPatch, SetEntry, WorkoutSession};
pub use workout_type::{
    Category, Equipment, MuscleGroup, WorkoutType, WorkoutTypeDraft, WorkoutTypePatch,
};
