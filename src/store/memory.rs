use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document::{authorize, Collection, Document, DocumentStore};
use crate::error::AppError;

/// In-process document store used by tests and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<(Collection, Uuid), Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(collection: Collection, id: Uuid) -> AppError {
    AppError::not_found(format!("{} {}", collection.as_str(), id))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, caller: Uuid, doc: Document) -> Result<Document, AppError> {
        authorize(caller, doc.owner_id)?;
        let mut docs = self.docs.write().await;
        let key = (doc.collection, doc.id);
        if docs.contains_key(&key) {
            return Err(AppError::Conflict(format!("document {} already exists", doc.id)));
        }
        docs.insert(key, doc.clone());
        Ok(doc)
    }

    async fn get(
        &self,
        caller: Uuid,
        collection: Collection,
        id: Uuid,
    ) -> Result<Document, AppError> {
        let docs = self.docs.read().await;
        let doc = docs.get(&(collection, id)).ok_or_else(|| missing(collection, id))?;
        authorize(caller, doc.owner_id)?;
        Ok(doc.clone())
    }

    async fn list(&self, caller: Uuid, collection: Collection) -> Result<Vec<Document>, AppError> {
        let docs = self.docs.read().await;
        let mut owned: Vec<Document> = docs
            .values()
            .filter(|d| d.collection == collection && d.owner_id == caller)
            .cloned()
            .collect();
        owned.sort_by_key(|d| d.created_at);
        Ok(owned)
    }

    async fn replace(&self, caller: Uuid, doc: Document) -> Result<Document, AppError> {
        let mut docs = self.docs.write().await;
        let key = (doc.collection, doc.id);
        let current = docs
            .get(&key)
            .ok_or_else(|| missing(doc.collection, doc.id))?;
        authorize(caller, current.owner_id)?;
        // ownership is immutable
        authorize(caller, doc.owner_id)?;
        docs.insert(key, doc.clone());
        Ok(doc)
    }

    async fn delete(
        &self,
        caller: Uuid,
        collection: Collection,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut docs = self.docs.write().await;
        let current = docs
            .get(&(collection, id))
            .ok_or_else(|| missing(collection, id))?;
        authorize(caller, current.owner_id)?;
        docs.remove(&(collection, id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::OffsetDateTime;

    fn doc(owner_id: Uuid) -> Document {
        let now = OffsetDateTime::now_utc();
        Document {
            id: Uuid::new_v4(),
            collection: Collection::WorkoutTypes,
            owner_id,
            body: json!({ "name": "Squat" }),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_requires_caller_to_be_owner() {
        let store = MemoryStore::new();
        let err = store
            .insert(Uuid::new_v4(), doc(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
    }

    #[tokio::test]
    async fn foreign_documents_are_denied_and_unlisted() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let d = store.insert(alice, doc(alice)).await.unwrap();

        let err = store.get(bob, Collection::WorkoutTypes, d.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
        assert!(store
            .list(bob, Collection::WorkoutTypes)
            .await
            .unwrap()
            .is_empty());
        let err = store
            .delete(bob, Collection::WorkoutTypes, d.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
        assert_eq!(store.list(alice, Collection::WorkoutTypes).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replace_cannot_transfer_ownership() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let mut d = store.insert(alice, doc(alice)).await.unwrap();
        d.owner_id = Uuid::new_v4();
        let err = store.replace(alice, d).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
    }

    #[tokio::test]
    async fn missing_documents_are_not_found() {
        let store = MemoryStore::new();
        let err = store
            .delete(Uuid::new_v4(), Collection::WorkoutSessions, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
