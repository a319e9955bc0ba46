use serde::Deserialize;
use validator::Validate;

use super::clean_text;
use crate::domain::{Category, Equipment, MuscleGroup, WorkoutTypeDraft, WorkoutTypePatch};
use crate::error::AppError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WorkoutTypeInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Exercise name is required (max 100 characters)"))]
    pub name: String,
    pub category: Category,
    pub equipment: Equipment,
    #[serde(default)]
    #[validate(length(min = 1, message = "Select at least one muscle group"))]
    pub muscle_groups: Vec<MuscleGroup>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct WorkoutTypePatchInput {
    #[validate(length(min = 1, max = 100, message = "Exercise name is required (max 100 characters)"))]
    pub name: Option<String>,
    pub category: Option<Category>,
    pub equipment: Option<Equipment>,
    #[validate(length(min = 1, message = "Select at least one muscle group"))]
    pub muscle_groups: Option<Vec<MuscleGroup>>,
    pub tags: Option<Vec<String>>,
}

fn dedup_muscles(mut groups: Vec<MuscleGroup>) -> Vec<MuscleGroup> {
    let mut seen = Vec::with_capacity(groups.len());
    groups.retain(|g| {
        if seen.contains(g) {
            false
        } else {
            seen.push(*g);
            true
        }
    });
    groups
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.into_iter().filter_map(|t| clean_text(Some(t))) {
        let tag = tag.to_lowercase();
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

impl WorkoutTypeInput {
    pub fn into_draft(mut self) -> Result<WorkoutTypeDraft, AppError> {
        self.name = self.name.trim().to_string();
        self.validate()?;
        Ok(WorkoutTypeDraft {
            name: self.name,
            category: self.category,
            equipment: self.equipment,
            muscle_groups: dedup_muscles(self.muscle_groups),
            tags: normalize_tags(self.tags),
            is_default: false,
        })
    }
}

impl WorkoutTypePatchInput {
    pub fn into_patch(mut self) -> Result<WorkoutTypePatch, AppError> {
        self.name = self.name.map(|n| n.trim().to_string());
        self.validate()?;
        Ok(WorkoutTypePatch {
            name: self.name,
            category: self.category,
            equipment: self.equipment,
            muscle_groups: self.muscle_groups.map(dedup_muscles),
            tags: self.tags.map(normalize_tags),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, muscles: Vec<MuscleGroup>) -> WorkoutTypeInput {
        WorkoutTypeInput {
            name: name.into(),
            category: Category::Upper,
            equipment: Equipment::Dumbbell,
            muscle_groups: muscles,
            tags: vec![" Push ".into(), "push".into(), "".into()],
        }
    }

    #[test]
    fn normalises_valid_input() {
        let draft = input("  Incline Press ", vec![MuscleGroup::Chest, MuscleGroup::Chest])
            .into_draft()
            .unwrap();
        assert_eq!(draft.name, "Incline Press");
        assert_eq!(draft.muscle_groups, vec![MuscleGroup::Chest]);
        assert_eq!(draft.tags, vec!["push".to_string()]);
        assert!(!draft.is_default);
    }

    #[test]
    fn rejects_blank_name_and_empty_muscles() {
        let err = input("   ", vec![]).into_draft().unwrap_err();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["muscle_groups", "name"]);
    }

    #[test]
    fn patch_validates_only_present_fields() {
        assert!(WorkoutTypePatchInput::default().into_patch().is_ok());
        let err = WorkoutTypePatchInput {
            muscle_groups: Some(vec![]),
            ..WorkoutTypePatchInput::default()
        }
        .into_patch()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f[0].field == "muscle_groups"));
    }

    #[test]
    fn unknown_category_is_rejected_by_the_schema() {
        let raw = r#"{"name":"Curl","category":"arms","equipment":"dumbbell","muscle_groups":["biceps"]}"#;
        assert!(serde_json::from_str::<WorkoutTypeInput>(raw).is_err());
    }
}
