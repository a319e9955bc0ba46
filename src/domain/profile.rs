use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

/// Per-user profile document; its id is the owner's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub display_name: Option<Option<String>>,
    pub weight_unit: Option<WeightUnit>,
}

impl ProfilePatch {
    pub fn apply(self, target: &mut UserProfile) {
        if let Some(display_name) = self.display_name {
            target.display_name = display_name;
        }
        if let Some(unit) = self.weight_unit {
            target.weight_unit = unit;
        }
    }
}
