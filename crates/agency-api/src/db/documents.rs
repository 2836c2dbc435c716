//! Document persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `documents` table,
//! keyed by `(collection, id)`. The JSON body is the source of truth; the
//! timestamp columns mirror `createdAt` / `updatedAt` for ordering.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::store::{doc_id, Document};

/// Upsert a document.
pub async fn save(pool: &PgPool, collection: &str, doc: &Document) -> Result<(), sqlx::Error> {
    let id = doc_id(doc)
        .ok_or_else(|| sqlx::Error::Protocol(format!("{collection} document has no _id")))?;
    let created_at = parse_timestamp(doc.get("createdAt"));
    let updated_at = parse_timestamp(doc.get("updatedAt"));
    let body = Value::Object(doc.clone());

    sqlx::query(
        "INSERT INTO documents (collection, id, body, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (collection, id) DO UPDATE SET
            body = EXCLUDED.body,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(collection)
    .bind(id)
    .bind(&body)
    .bind(created_at)
    .bind(updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a document. Returns whether a row was removed.
pub async fn delete(pool: &PgPool, collection: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
        .bind(collection)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Load every document of one collection, oldest first.
pub async fn load_collection(pool: &PgPool, collection: &str) -> Result<Vec<Document>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT collection, id, body FROM documents WHERE collection = $1 ORDER BY created_at",
    )
    .bind(collection)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(DocumentRow::into_document).map(|(_, d)| d).collect())
}

/// Load every document for hydration on startup, as `(collection, document)`.
pub async fn load_all(pool: &PgPool) -> Result<Vec<(String, Document)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT collection, id, body FROM documents ORDER BY collection, created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(DocumentRow::into_document).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct DocumentRow {
    collection: String,
    id: String,
    body: Value,
}

impl DocumentRow {
    fn into_document(self) -> Option<(String, Document)> {
        match self.body {
            Value::Object(mut doc) => {
                doc.insert("_id".into(), Value::String(self.id.trim().to_string()));
                Some((self.collection, doc))
            }
            other => {
                tracing::warn!(
                    collection = %self.collection,
                    id = %self.id,
                    kind = %json_kind(&other),
                    "skipping stored document whose body is not a JSON object"
                );
                None
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_timestamp(value: Option<&Value>) -> DateTime<Utc> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
