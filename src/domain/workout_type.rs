use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Upper,
    Lower,
    FullBody,
    Cardio,
    Core,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Upper => "upper",
            Category::Lower => "lower",
            Category::FullBody => "full-body",
            Category::Cardio => "cardio",
            Category::Core => "core",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upper" => Ok(Category::Upper),
            "lower" => Ok(Category::Lower),
            "full-body" | "full_body" | "fullbody" => Ok(Category::FullBody),
            "cardio" => Ok(Category::Cardio),
            "core" => Ok(Category::Core),
            other => Err(format!("unknown category `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Machine,
    Cable,
    Bodyweight,
    Kettlebell,
    Band,
    CardioMachine,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Core,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    FullBody,
}

/// A user-defined (or catalogue-seeded) exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutType {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub category: Category,
    pub equipment: Equipment,
    pub muscle_groups: Vec<MuscleGroup>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated, normalised new workout type.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutTypeDraft {
    pub name: String,
    pub category: Category,
    pub equipment: Equipment,
    pub muscle_groups: Vec<MuscleGroup>,
    pub tags: Vec<String>,
    pub is_default: bool,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutTypePatch {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub equipment: Option<Equipment>,
    pub muscle_groups: Option<Vec<MuscleGroup>>,
    pub tags: Option<Vec<String>>,
}

impl WorkoutTypePatch {
    pub fn apply(self, target: &mut WorkoutType) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(category) = self.category {
            target.category = category;
        }
        if let Some(equipment) = self.equipment {
            target.equipment = equipment;
        }
        if let Some(muscle_groups) = self.muscle_groups {
            target.muscle_groups = muscle_groups;
        }
        if let Some(tags) = self.tags {
            target.tags = tags;
        }
    }
}
