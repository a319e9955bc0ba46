use crate::domain::{Category, Equipment, MuscleGroup, WorkoutTypeDraft};

fn entry(
    name: &str,
    category: Category,
    equipment: Equipment,
    muscle_groups: &[MuscleGroup],
    tags: &[&str],
) -> WorkoutTypeDraft {
    WorkoutTypeDraft {
        name: name.to_string(),
        category,
        equipment,
        muscle_groups: muscle_groups.to_vec(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        is_default: true,
    }
}

/// Built-in exercise catalogue offered by "load defaults".
pub(crate) fn default_catalogue() -> Vec<WorkoutTypeDraft> {
    use MuscleGroup::*;

    vec![
        entry("Bench Press", Category::Upper, Equipment::Barbell, &[Chest, Triceps, Shoulders], &["strength", "push"]),
        entry("Overhead Press", Category::Upper, Equipment::Barbell, &[Shoulders, Triceps], &["strength", "push"]),
        entry("Barbell Row", Category::Upper, Equipment::Barbell, &[Back, Biceps], &["strength", "pull"]),
        entry("Pull-Up", Category::Upper, Equipment::Bodyweight, &[Back, Biceps], &["strength", "pull"]),
        entry("Dumbbell Curl", Category::Upper, Equipment::Dumbbell, &[Biceps, Forearms], &["hypertrophy", "pull"]),
        entry("Triceps Pushdown", Category::Upper, Equipment::Cable, &[Triceps], &["hypertrophy", "push"]),
        entry("Squat", Category::Lower, Equipment::Barbell, &[Quads, Glutes, Hamstrings], &["strength", "legs"]),
        entry("Romanian Deadlift", Category::Lower, Equipment::Barbell, &[Hamstrings, Glutes], &["strength", "hinge"]),
        entry("Leg Press", Category::Lower, Equipment::Machine, &[Quads, Glutes], &["hypertrophy", "legs"]),
        entry("Calf Raise", Category::Lower, Equipment::Machine, &[Calves], &["hypertrophy", "legs"]),
        entry("Deadlift", Category::FullBody, Equipment::Barbell, &[Back, Glutes, Hamstrings], &["strength", "hinge"]),
        entry("Kettlebell Swing", Category::FullBody, Equipment::Kettlebell, &[Glutes, Hamstrings, Core], &["conditioning"]),
        entry("Plank", Category::Core, Equipment::Bodyweight, &[Core], &["stability"]),
        entry("Hanging Leg Raise", Category::Core, Equipment::Bodyweight, &[Core], &["strength"]),
        entry("Running", Category::Cardio, Equipment::Other, &[FullBody], &["endurance", "outdoor"]),
        entry("Rowing Machine", Category::Cardio, Equipment::CardioMachine, &[Back, FullBody], &["endurance"]),
        entry("Cycling", Category::Cardio, Equipment::CardioMachine, &[Quads, Calves], &["endurance"]),
    ]
}
