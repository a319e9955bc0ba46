use serde::Deserialize;
use validator::Validate;

use super::clean_text;
use crate::domain::{ProfilePatch, WeightUnit};
use crate::error::AppError;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileInput {
    /// An empty string clears the display name.
    #[validate(length(max = 60, message = "Display name is limited to 60 characters"))]
    pub display_name: Option<String>,
    pub weight_unit: Option<WeightUnit>,
}

impl ProfileInput {
    pub fn into_patch(self) -> Result<ProfilePatch, AppError> {
        self.validate()?;
        Ok(ProfilePatch {
            display_name: self.display_name.map(|n| clean_text(Some(n))),
            weight_unit: self.weight_unit,
        })
    }
}
