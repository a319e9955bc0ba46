use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::{DocumentStore, Gateway, Record, SessionQuery, Subscription};
use crate::domain::{ExerciseEntry, SessionDraft, SessionPatch, WorkoutSession, WorkoutType};
use crate::error::AppError;

impl Gateway {
    /// Resolves every referenced workout type for `owner_id` and refreshes the
    /// cached display names. Unknown or foreign types fail with `NotFound`.
    #[instrument(skip(self, exercises), fields(count = exercises.len()))]
    async fn resolve_exercises(
        &self,
        owner_id: Uuid,
        mut exercises: Vec<ExerciseEntry>,
    ) -> Result<Vec<ExerciseEntry>, AppError> {
        for entry in &mut exercises {
            let workout_type: WorkoutType = self.get(owner_id, entry.workout_type_id).await?;
            entry.workout_type_name = workout_type.name;
        }
        Ok(exercises)
    }

    pub async fn create_session(
        &self,
        owner_id: Uuid,
        draft: SessionDraft,
    ) -> Result<WorkoutSession, AppError> {
        let exercises = self.resolve_exercises(owner_id, draft.exercises).await?;
        let now = OffsetDateTime::now_utc();
        let record = WorkoutSession {
            id: Uuid::new_v4(),
            owner_id,
            date: draft.date,
            duration_minutes: draft.duration_minutes,
            exercises,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };
        self.insert(owner_id, record).await
    }

    pub async fn get_session(&self, owner_id: Uuid, id: Uuid) -> Result<WorkoutSession, AppError> {
        self.get(owner_id, id).await
    }

    pub async fn list_sessions(
        &self,
        owner_id: Uuid,
        query: &SessionQuery,
    ) -> Result<Vec<WorkoutSession>, AppError> {
        let matching: Vec<WorkoutSession> = self
            .list::<WorkoutSession>(owner_id)
            .await?
            .into_iter()
            .filter(|s| query.matches(s))
            .collect();
        Ok(query.arrange(matching))
    }

    pub async fn update_session(
        &self,
        owner_id: Uuid,
        id: Uuid,
        mut patch: SessionPatch,
    ) -> Result<WorkoutSession, AppError> {
        if let Some(exercises) = patch.exercises.take() {
            // ownership is settled before the referenced types are looked up
            self.store.get(owner_id, WorkoutSession::COLLECTION, id).await?;
            patch.exercises = Some(self.resolve_exercises(owner_id, exercises).await?);
        }
        self.update(owner_id, id, |s: &mut WorkoutSession| patch.apply(s))
            .await
    }

    pub async fn delete_session(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.delete::<WorkoutSession>(owner_id, id).await
    }

    pub fn watch_sessions(
        &self,
        owner_id: Uuid,
        query: SessionQuery,
    ) -> Subscription<Vec<WorkoutSession>> {
        let gateway = self.clone();
        self.watch::<WorkoutSession, _, _, _>(owner_id, move || {
            let gateway = gateway.clone();
            let query = query.clone();
            async move { gateway.list_sessions(owner_id, &query).await }
        })
    }
}
