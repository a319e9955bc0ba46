use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{UserProfile, WorkoutSession, WorkoutType};
use crate::error::AppError;

/// Logical collections of the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Profiles,
    WorkoutTypes,
    WorkoutSessions,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Profiles => "profiles",
            Collection::WorkoutTypes => "workout_types",
            Collection::WorkoutSessions => "workout_sessions",
        }
    }
}

impl std::str::FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profiles" => Ok(Collection::Profiles),
            "workout_types" => Ok(Collection::WorkoutTypes),
            "workout_sessions" => Ok(Collection::WorkoutSessions),
            other => Err(AppError::internal(format!("unknown collection `{}`", other))),
        }
    }
}

/// A stored document: owner-scoped JSON body plus the metadata the access rules need.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub collection: Collection,
    pub owner_id: Uuid,
    pub body: serde_json::Value,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Document {
    pub fn from_record<R: Record>(record: &R) -> Result<Self, AppError> {
        Ok(Self {
            id: record.id(),
            collection: R::COLLECTION,
            owner_id: record.owner_id(),
            body: serde_json::to_value(record)?,
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        })
    }

    pub fn into_record<R: Record>(self) -> Result<R, AppError> {
        if self.collection != R::COLLECTION {
            return Err(AppError::internal(format!(
                "document {} belongs to {}, not {}",
                self.id,
                self.collection.as_str(),
                R::COLLECTION.as_str()
            )));
        }
        Ok(serde_json::from_value(self.body)?)
    }
}

/// Typed record living in one collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
    fn created_at(&self) -> OffsetDateTime;
    fn updated_at(&self) -> OffsetDateTime;
    fn touch(&mut self, at: OffsetDateTime);
}

macro_rules! impl_record {
    ($ty:ty, $collection:expr, $kind:literal) => {
        impl Record for $ty {
            const COLLECTION: Collection = $collection;
            const KIND: &'static str = $kind;

            fn id(&self) -> Uuid {
                self.id
            }
            fn owner_id(&self) -> Uuid {
                self.owner_id
            }
            fn created_at(&self) -> OffsetDateTime {
                self.created_at
            }
            fn updated_at(&self) -> OffsetDateTime {
                self.updated_at
            }
            fn touch(&mut self, at: OffsetDateTime) {
                self.updated_at = at;
            }
        }
    };
}

impl_record!(UserProfile, Collection::Profiles, "profile");
impl_record!(WorkoutType, Collection::WorkoutTypes, "workout type");
impl_record!(WorkoutSession, Collection::WorkoutSessions, "workout session");

/// Storage-boundary access rule: a caller may only touch documents it owns.
pub fn authorize(caller: Uuid, owner_id: Uuid) -> Result<(), AppError> {
    if caller == owner_id {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// The document store. Every call carries the caller's identity and is checked
/// against the document owner; implementations are the trust boundary.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fails with `PermissionDenied` unless `doc.owner_id == caller`.
    async fn insert(&self, caller: Uuid, doc: Document) -> Result<Document, AppError>;
    async fn get(&self, caller: Uuid, collection: Collection, id: Uuid)
        -> Result<Document, AppError>;
    /// Documents of `collection` owned by `caller`.
    async fn list(&self, caller: Uuid, collection: Collection) -> Result<Vec<Document>, AppError>;
    async fn replace(&self, caller: Uuid, doc: Document) -> Result<Document, AppError>;
    async fn delete(&self, caller: Uuid, collection: Collection, id: Uuid)
        -> Result<(), AppError>;
}
