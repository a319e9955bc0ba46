use std::collections::HashSet;

use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{defaults::default_catalogue, Gateway, Subscription, WorkoutTypeQuery};
use crate::domain::{WorkoutType, WorkoutTypeDraft, WorkoutTypePatch};
use crate::error::AppError;

impl Gateway {
    pub async fn create_workout_type(
        &self,
        owner_id: Uuid,
        draft: WorkoutTypeDraft,
    ) -> Result<WorkoutType, AppError> {
        let now = OffsetDateTime::now_utc();
        let record = WorkoutType {
            id: Uuid::new_v4(),
            owner_id,
            name: draft.name,
            category: draft.category,
            equipment: draft.equipment,
            muscle_groups: draft.muscle_groups,
            tags: draft.tags,
            is_default: draft.is_default,
            created_at: now,
            updated_at: now,
        };
        self.insert(owner_id, record).await
    }

    pub async fn get_workout_type(&self, owner_id: Uuid, id: Uuid) -> Result<WorkoutType, AppError> {
        self.get(owner_id, id).await
    }

    pub async fn list_workout_types(
        &self,
        owner_id: Uuid,
        query: &WorkoutTypeQuery,
    ) -> Result<Vec<WorkoutType>, AppError> {
        let mut items: Vec<WorkoutType> = self
            .list::<WorkoutType>(owner_id)
            .await?
            .into_iter()
            .filter(|t| query.matches(t))
            .collect();
        query.sort(&mut items);
        Ok(items)
    }

    pub async fn update_workout_type(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: WorkoutTypePatch,
    ) -> Result<WorkoutType, AppError> {
        self.update(owner_id, id, |t: &mut WorkoutType| patch.apply(t))
            .await
    }

    pub async fn delete_workout_type(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.delete::<WorkoutType>(owner_id, id).await
    }

    /// Seeds the built-in catalogue, skipping names the owner already has.
    #[instrument(skip(self))]
    pub async fn load_default_workout_types(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<WorkoutType>, AppError> {
        let existing: HashSet<String> = self
            .list::<WorkoutType>(owner_id)
            .await?
            .into_iter()
            .map(|t| t.name.to_lowercase())
            .collect();

        let mut created = Vec::new();
        for draft in default_catalogue() {
            if existing.contains(&draft.name.to_lowercase()) {
                continue;
            }
            created.push(self.create_workout_type(owner_id, draft).await?);
        }
        info!(%owner_id, created = created.len(), "default workout types loaded");
        Ok(created)
    }

    pub fn watch_workout_types(
        &self,
        owner_id: Uuid,
        query: WorkoutTypeQuery,
    ) -> Subscription<Vec<WorkoutType>> {
        let gateway = self.clone();
        self.watch::<WorkoutType, _, _, _>(owner_id, move || {
            let gateway = gateway.clone();
            let query = query.clone();
            async move { gateway.list_workout_types(owner_id, &query).await }
        })
    }
}
