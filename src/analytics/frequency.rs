use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use uuid::Uuid;

use super::volume::entry_volume;
use crate::domain::{MuscleGroup, WorkoutSession, WorkoutType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseFrequency {
    pub workout_type_id: Uuid,
    /// Cached name from the most recent session containing the exercise.
    pub name: String,
    pub sessions: u32,
    pub sets: u32,
    pub volume: f64,
}

/// How often each exercise was trained, most frequent first.
pub fn exercise_frequency(sessions: &[WorkoutSession]) -> Vec<ExerciseFrequency> {
    let mut by_id: HashMap<Uuid, (ExerciseFrequency, time::Date)> = HashMap::new();

    for session in sessions {
        let mut seen_here: Vec<Uuid> = Vec::new();
        for entry in &session.exercises {
            let (stats, latest) = by_id.entry(entry.workout_type_id).or_insert_with(|| {
                (
                    ExerciseFrequency {
                        workout_type_id: entry.workout_type_id,
                        name: entry.workout_type_name.clone(),
                        sessions: 0,
                        sets: 0,
                        volume: 0.0,
                    },
                    session.date,
                )
            });
            if !seen_here.contains(&entry.workout_type_id) {
                seen_here.push(entry.workout_type_id);
                stats.sessions += 1;
            }
            stats.sets += entry.sets.len() as u32;
            stats.volume += entry_volume(entry);
            if session.date >= *latest {
                *latest = session.date;
                stats.name = entry.workout_type_name.clone();
            }
        }
    }

    let mut out: Vec<ExerciseFrequency> = by_id.into_values().map(|(stats, _)| stats).collect();
    out.sort_by(|a, b| {
        b.sessions
            .cmp(&a.sessions)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    out
}

/// Exercise entries per muscle group, using the muscle sets of `types`.
/// Entries whose type is unknown (e.g. deleted) are skipped.
pub fn muscle_group_frequency(
    sessions: &[WorkoutSession],
    types: &[WorkoutType],
) -> BTreeMap<MuscleGroup, u32> {
    let muscles: HashMap<Uuid, &[MuscleGroup]> = types
        .iter()
        .map(|t| (t.id, t.muscle_groups.as_slice()))
        .collect();

    let mut counts = BTreeMap::new();
    for entry in sessions.iter().flat_map(|s| &s.exercises) {
        if let Some(groups) = muscles.get(&entry.workout_type_id) {
            for group in groups.iter() {
                *counts.entry(*group).or_insert(0) += 1;
            }
        }
    }
    counts
}
