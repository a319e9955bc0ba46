use time::OffsetDateTime;
use uuid::Uuid;

use super::Gateway;
use crate::domain::{ProfilePatch, UserProfile, WeightUnit};
use crate::error::AppError;

impl Gateway {
    /// Profile document for a freshly registered account; its id is the user id.
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        email: &str,
        display_name: Option<String>,
    ) -> Result<UserProfile, AppError> {
        let now = OffsetDateTime::now_utc();
        let profile = UserProfile {
            id: user_id,
            owner_id: user_id,
            email: email.to_string(),
            display_name,
            weight_unit: WeightUnit::default(),
            created_at: now,
            updated_at: now,
        };
        self.insert(user_id, profile).await
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        self.get(user_id, user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        patch: ProfilePatch,
    ) -> Result<UserProfile, AppError> {
        self.update(user_id, user_id, |p: &mut UserProfile| patch.apply(p))
            .await
    }
}
