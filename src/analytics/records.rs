use serde::Serialize;
use time::Date;
use uuid::Uuid;

use super::volume::{entry_volume, set_volume};
use crate::domain::{dates::iso_date, WorkoutSession};

/// Best marks for one exercise. The three maxima are independent: the heaviest
/// set need not be the set with the most volume. `None` means no qualifying set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalRecords {
    pub workout_type_id: Uuid,
    pub max_weight: Option<f64>,
    pub max_reps: Option<u32>,
    pub max_volume: Option<f64>,
}

fn max_f64(current: Option<f64>, candidate: Option<f64>) -> Option<f64> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

pub fn personal_records(sessions: &[WorkoutSession], workout_type_id: Uuid) -> PersonalRecords {
    let sets = sessions
        .iter()
        .flat_map(|s| &s.exercises)
        .filter(|e| e.workout_type_id == workout_type_id)
        .flat_map(|e| &e.sets);

    let mut records = PersonalRecords {
        workout_type_id,
        max_weight: None,
        max_reps: None,
        max_volume: None,
    };
    for set in sets {
        records.max_weight = max_f64(records.max_weight, set.weight);
        records.max_reps = records.max_reps.max(set.reps);
        records.max_volume = max_f64(records.max_volume, set_volume(set));
    }
    records
}

/// One chart point per session that contains the exercise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub session_id: Uuid,
    pub top_weight: Option<f64>,
    pub best_set_volume: Option<f64>,
    pub volume: f64,
}

pub fn exercise_progress(sessions: &[WorkoutSession], workout_type_id: Uuid) -> Vec<ProgressPoint> {
    let mut points: Vec<ProgressPoint> = sessions
        .iter()
        .filter(|s| s.includes_exercise(workout_type_id))
        .map(|s| {
            let entries = s
                .exercises
                .iter()
                .filter(|e| e.workout_type_id == workout_type_id);
            let mut point = ProgressPoint {
                date: s.date,
                session_id: s.id,
                top_weight: None,
                best_set_volume: None,
                volume: 0.0,
            };
            for entry in entries {
                point.volume += entry_volume(entry);
                for set in &entry.sets {
                    point.top_weight = max_f64(point.top_weight, set.weight);
                    point.best_set_volume = max_f64(point.best_set_volume, set_volume(set));
                }
            }
            point
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{entry, session};
    use crate::domain::SetEntry;
    use time::macros::date;

    #[test]
    fn maxima_are_tracked_independently() {
        let bench = Uuid::new_v4();
        let sessions = vec![session(
            date!(2024 - 01 - 01),
            vec![entry(
                bench,
                "Bench",
                vec![SetEntry::strength(100.0, 5), SetEntry::strength(80.0, 8)],
            )],
        )];
        let pr = personal_records(&sessions, bench);
        assert_eq!(pr.max_weight, Some(100.0));
        assert_eq!(pr.max_reps, Some(8));
        assert_eq!(pr.max_volume, Some(640.0));
    }

    #[test]
    fn empty_collection_yields_no_records() {
        let pr = personal_records(&[], Uuid::new_v4());
        assert_eq!(pr.max_weight, None);
        assert_eq!(pr.max_reps, None);
        assert_eq!(pr.max_volume, None);
    }

    #[test]
    fn cardio_sets_and_other_exercises_are_ignored() {
        let run = Uuid::new_v4();
        let bench = Uuid::new_v4();
        let sessions = vec![session(
            date!(2024 - 01 - 01),
            vec![
                entry(run, "Run", vec![SetEntry::cardio(5.0, 1800)]),
                entry(bench, "Bench", vec![SetEntry::strength(60.0, 12)]),
            ],
        )];
        let pr = personal_records(&sessions, run);
        assert_eq!(pr.max_weight, None);
        assert_eq!(pr.max_reps, None);
        assert_eq!(pr.max_volume, None);
    }

    #[test]
    fn records_are_order_independent_and_monotonic() {
        let squat = Uuid::new_v4();
        let mut sessions = vec![
            session(date!(2024 - 01 - 01), vec![entry(squat, "Squat", vec![SetEntry::strength(120.0, 3)])]),
            session(date!(2024 - 01 - 08), vec![entry(squat, "Squat", vec![SetEntry::strength(100.0, 8)])]),
        ];
        let before = personal_records(&sessions, squat);
        sessions.reverse();
        assert_eq!(personal_records(&sessions, squat), before);

        sessions.push(session(
            date!(2024 - 01 - 15),
            vec![entry(squat, "Squat", vec![SetEntry::strength(125.0, 1)])],
        ));
        let after = personal_records(&sessions, squat);
        assert_eq!(after.max_weight, Some(125.0));
        assert!(after.max_weight >= before.max_weight);
        assert_eq!(after.max_volume, Some(800.0));

        sessions.push(session(
            date!(2024 - 01 - 22),
            vec![entry(squat, "Squat", vec![SetEntry::strength(60.0, 5)])],
        ));
        assert_eq!(personal_records(&sessions, squat).max_weight, Some(125.0));
    }

    #[test]
    fn progress_is_chronological_per_session() {
        let bench = Uuid::new_v4();
        let other = Uuid::new_v4();
        let sessions = vec![
            session(date!(2024 - 02 - 10), vec![entry(bench, "Bench", vec![SetEntry::strength(90.0, 5), SetEntry::strength(70.0, 10)])]),
            session(date!(2024 - 02 - 01), vec![entry(bench, "Bench", vec![SetEntry::strength(85.0, 5)])]),
            session(date!(2024 - 02 - 05), vec![entry(other, "Row", vec![SetEntry::strength(60.0, 8)])]),
        ];
        let points = exercise_progress(&sessions, bench);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, date!(2024 - 02 - 01));
        assert_eq!(points[1].top_weight, Some(90.0));
        assert_eq!(points[1].best_set_volume, Some(700.0));
        assert_eq!(points[1].volume, 1150.0);
    }
}
