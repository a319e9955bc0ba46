//! Persistence gateway: typed, owner-scoped access to the document collections.

mod defaults;
pub mod document;
pub mod memory;
pub mod postgres;
mod profiles;
pub mod query;
mod sessions;
pub mod subscription;
mod workout_types;

use std::{future::Future, sync::Arc};

use time::OffsetDateTime;
use tracing::{debug, instrument};
use uuid::Uuid;

pub use document::{Collection, Document, DocumentStore, Record};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use query::{Direction, SessionOrder, SessionQuery, WorkoutTypeOrder, WorkoutTypeQuery};
pub use subscription::{Change, ChangeHub, Subscription};

use crate::error::AppError;

/// Entry point for every read and write of user data. The caller's identity is
/// an explicit argument of each operation.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn DocumentStore>,
    changes: ChangeHub,
}

impl Gateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            changes: ChangeHub::default(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Number of open `watch_*` subscriptions across all owners.
    pub fn live_subscriptions(&self) -> usize {
        self.changes.listeners()
    }

    fn notify<R: Record>(&self, owner_id: Uuid) {
        self.changes.publish(Change {
            owner_id,
            collection: R::COLLECTION,
        });
    }

    #[instrument(skip(self, record), fields(kind = R::KIND))]
    pub async fn insert<R: Record>(&self, caller: Uuid, record: R) -> Result<R, AppError> {
        let doc = Document::from_record(&record)?;
        let stored = self.store.insert(caller, doc).await?;
        self.notify::<R>(caller);
        debug!(id = %stored.id, "record created");
        stored.into_record()
    }

    /// Read by id. Records owned by someone else are reported as absent.
    #[instrument(skip(self), fields(kind = R::KIND))]
    pub async fn get<R: Record>(&self, caller: Uuid, id: Uuid) -> Result<R, AppError> {
        match self.store.get(caller, R::COLLECTION, id).await {
            Ok(doc) => doc.into_record(),
            Err(AppError::PermissionDenied) => {
                debug!(%id, "read of foreign record hidden as not found");
                Err(AppError::not_found(format!("{} {}", R::KIND, id)))
            }
            Err(AppError::NotFound(_)) => Err(AppError::not_found(format!("{} {}", R::KIND, id))),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self), fields(kind = R::KIND))]
    pub async fn list<R: Record>(&self, caller: Uuid) -> Result<Vec<R>, AppError> {
        let docs = self.store.list(caller, R::COLLECTION).await?;
        docs.into_iter()
            .filter(|d| d.owner_id == caller)
            .map(Document::into_record)
            .collect()
    }

    /// Read-modify-write of one record; always re-stamps `updated_at`.
    #[instrument(skip(self, change), fields(kind = R::KIND))]
    pub async fn update<R, F>(&self, caller: Uuid, id: Uuid, change: F) -> Result<R, AppError>
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        let mut record: R = self.store.get(caller, R::COLLECTION, id).await?.into_record()?;
        change(&mut record);
        record.touch(OffsetDateTime::now_utc());
        let stored = self
            .store
            .replace(caller, Document::from_record(&record)?)
            .await?;
        self.notify::<R>(caller);
        debug!(%id, "record updated");
        stored.into_record()
    }

    #[instrument(skip(self), fields(kind = R::KIND))]
    pub async fn delete<R: Record>(&self, caller: Uuid, id: Uuid) -> Result<(), AppError> {
        self.store.delete(caller, R::COLLECTION, id).await?;
        self.notify::<R>(caller);
        debug!(%id, "record deleted");
        Ok(())
    }

    /// Live variant of a query over `R`'s collection for `owner_id`.
    pub fn watch<R, T, F, Fut>(&self, owner_id: Uuid, fetch: F) -> Subscription<T>
    where
        R: Record,
        T: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        Subscription::spawn(&self.changes, owner_id, R::COLLECTION, fetch)
    }
}
