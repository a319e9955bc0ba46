use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::document::{authorize, Collection, Document, DocumentStore};
use crate::error::AppError;

/// Document store backed by the `documents` table (JSONB bodies).
#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn owner_of(&self, collection: Collection, id: Uuid) -> Result<Uuid, AppError> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT owner_id
              FROM documents
             WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        owner.ok_or_else(|| AppError::not_found(format!("{} {}", collection.as_str(), id)))
    }
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    collection: String,
    owner_id: Uuid,
    body: Json<serde_json::Value>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<DocumentRow> for Document {
    type Error = AppError;

    fn try_from(r: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            collection: r.collection.parse()?,
            owner_id: r.owner_id,
            body: r.body.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, caller: Uuid, doc: Document) -> Result<Document, AppError> {
        authorize(caller, doc.owner_id)?;
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (id, collection, owner_id, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, collection, owner_id, body, created_at, updated_at
            "#,
        )
        .bind(doc.id)
        .bind(doc.collection.as_str())
        .bind(doc.owner_id)
        .bind(Json(&doc.body))
        .bind(doc.created_at)
        .bind(doc.updated_at)
        .fetch_one(&self.db)
        .await?;
        debug!(id = %row.id, collection = %row.collection, "document inserted");
        row.try_into()
    }

    async fn get(
        &self,
        caller: Uuid,
        collection: Collection,
        id: Uuid,
    ) -> Result<Document, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, collection, owner_id, body, created_at, updated_at
              FROM documents
             WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} {}", collection.as_str(), id)))?;
        authorize(caller, row.owner_id)?;
        row.try_into()
    }

    async fn list(&self, caller: Uuid, collection: Collection) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, collection, owner_id, body, created_at, updated_at
              FROM documents
             WHERE collection = $1 AND owner_id = $2
             ORDER BY created_at ASC
            "#,
        )
        .bind(collection.as_str())
        .bind(caller)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(Document::try_from).collect()
    }

    async fn replace(&self, caller: Uuid, doc: Document) -> Result<Document, AppError> {
        authorize(caller, self.owner_of(doc.collection, doc.id).await?)?;
        authorize(caller, doc.owner_id)?;
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
               SET body = $1, updated_at = $2
             WHERE collection = $3 AND id = $4 AND owner_id = $5
            RETURNING id, collection, owner_id, body, created_at, updated_at
            "#,
        )
        .bind(Json(&doc.body))
        .bind(doc.updated_at)
        .bind(doc.collection.as_str())
        .bind(doc.id)
        .bind(caller)
        .fetch_optional(&self.db)
        .await?
        // deleted between the ownership check and the update
        .ok_or_else(|| AppError::not_found(format!("{} {}", doc.collection.as_str(), doc.id)))?;
        row.try_into()
    }

    async fn delete(
        &self,
        caller: Uuid,
        collection: Collection,
        id: Uuid,
    ) -> Result<(), AppError> {
        authorize(caller, self.owner_of(collection, id).await?)?;
        sqlx::query(
            r#"
            DELETE FROM documents
             WHERE collection = $1 AND id = $2 AND owner_id = $3
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(caller)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
