use serde::Serialize;

use crate::domain::{ExerciseEntry, SetEntry, WorkoutSession};

/// weight × reps, only when the set carries both.
pub fn set_volume(set: &SetEntry) -> Option<f64> {
    match (set.weight, set.reps) {
        (Some(weight), Some(reps)) => Some(weight * f64::from(reps)),
        _ => None,
    }
}

pub fn entry_volume(entry: &ExerciseEntry) -> f64 {
    entry.sets.iter().filter_map(set_volume).sum()
}

/// Total load of a session; sets missing weight or reps contribute nothing.
pub fn session_volume(session: &WorkoutSession) -> f64 {
    session.exercises.iter().map(entry_volume).sum()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub sessions: u32,
    pub total_duration_minutes: u64,
    pub total_sets: u64,
    pub total_volume: f64,
    pub average_duration_minutes: f64,
}

pub fn summarize(sessions: &[WorkoutSession]) -> TrainingSummary {
    let mut summary = sessions
        .iter()
        .fold(TrainingSummary::default(), |mut acc, s| {
            acc.sessions += 1;
            acc.total_duration_minutes += u64::from(s.duration_minutes);
            acc.total_sets += s.exercises.iter().map(|e| e.sets.len() as u64).sum::<u64>();
            acc.total_volume += session_volume(s);
            acc
        });
    if summary.sessions > 0 {
        summary.average_duration_minutes =
            summary.total_duration_minutes as f64 / f64::from(summary.sessions);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{entry, session};
    use time::macros::date;
    use uuid::Uuid;

    #[test]
    fn strength_sets_sum_weight_times_reps() {
        let id = Uuid::new_v4();
        let s = session(
            date!(2024 - 01 - 01),
            vec![entry(
                id,
                "Bench",
                vec![SetEntry::strength(100.0, 5), SetEntry::strength(80.0, 8)],
            )],
        );
        assert_eq!(session_volume(&s), 1140.0);
    }

    #[test]
    fn sets_without_weight_and_reps_contribute_nothing() {
        let id = Uuid::new_v4();
        let reps_only = SetEntry {
            reps: Some(12),
            ..SetEntry::default()
        };
        let weight_only = SetEntry {
            weight: Some(40.0),
            rpe: Some(8),
            ..SetEntry::default()
        };
        let s = session(
            date!(2024 - 01 - 01),
            vec![entry(
                id,
                "Mixed",
                vec![SetEntry::cardio(5.0, 1800), reps_only, weight_only],
            )],
        );
        assert_eq!(session_volume(&s), 0.0);
        assert_eq!(session_volume(&session(date!(2024 - 01 - 01), vec![])), 0.0);
    }

    #[test]
    fn volume_ignores_ordering_of_exercises_and_sets() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let sets = vec![
            SetEntry::strength(60.0, 10),
            SetEntry::strength(72.5, 6),
            SetEntry::strength(20.0, 15),
        ];
        let mut reversed_sets = sets.clone();
        reversed_sets.reverse();

        let forward = session(
            date!(2024 - 01 - 01),
            vec![
                entry(a, "A", sets),
                entry(b, "B", vec![SetEntry::strength(100.0, 3)]),
            ],
        );
        let backward = session(
            date!(2024 - 01 - 01),
            vec![
                entry(b, "B", vec![SetEntry::strength(100.0, 3)]),
                entry(a, "A", reversed_sets),
            ],
        );
        assert_eq!(session_volume(&forward), session_volume(&backward));
    }

    #[test]
    fn summary_totals_and_average() {
        let id = Uuid::new_v4();
        let mut short = session(date!(2024 - 01 - 01), vec![entry(id, "A", vec![SetEntry::strength(50.0, 10)])]);
        short.duration_minutes = 30;
        let mut long = session(
            date!(2024 - 01 - 02),
            vec![entry(id, "A", vec![SetEntry::strength(50.0, 10), SetEntry::cardio(1.0, 300)])],
        );
        long.duration_minutes = 90;

        let summary = summarize(&[short, long]);
        assert_eq!(summary.sessions, 2);
        assert_eq!(summary.total_duration_minutes, 120);
        assert_eq!(summary.total_sets, 3);
        assert_eq!(summary.total_volume, 1000.0);
        assert_eq!(summary.average_duration_minutes, 60.0);
        assert_eq!(summarize(&[]), TrainingSummary::default());
    }
}
