//! PostgreSQL + pgvector document store.
//!
//! Reads the LangChain PGVector schema: passages in `langchain_pg_embedding`,
//! joined to their collection in `langchain_pg_collection`. Distances use the
//! cosine operator `<=>`.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use super::store::{DocumentStore, Passage, StoreHit};
use crate::core::config::StoreConfig;
use crate::core::errors::CoreError;

const NEAREST_IN_COLLECTION_SQL: &str = "
    SELECT e.document, c.name AS collection_name,
           (e.embedding <=> $1::vector)::float8 AS distance
    FROM langchain_pg_embedding e
    JOIN langchain_pg_collection c ON e.collection_id = c.uuid
    WHERE c.name = $2
    ORDER BY e.embedding <=> $1::vector
    LIMIT $3";

const NEAREST_SQL: &str = "
    SELECT e.document, c.name AS collection_name,
           (e.embedding <=> $1::vector)::float8 AS distance
    FROM langchain_pg_embedding e
    JOIN langchain_pg_collection c ON e.collection_id = c.uuid
    ORDER BY e.embedding <=> $1::vector
    LIMIT $2";

pub struct PgVectorStore {
    pool: PgPool,
}

impl PgVectorStore {
    /// Builds a lazily-connecting pool; connection failures surface on the
    /// first query as store errors.
    pub fn connect(config: &StoreConfig) -> Self {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy_with(options);

        tracing::info!(
            "Document store: postgres://{}@{}:{}/{}",
            config.user,
            config.host,
            config.port,
            config.database
        );
        Self { pool }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_hit(row: &PgRow) -> Result<StoreHit, CoreError> {
        let document: Option<String> = row.try_get("document").map_err(CoreError::store)?;
        let collection_name: Option<String> =
            row.try_get("collection_name").map_err(CoreError::store)?;
        let distance: f64 = row.try_get("distance").map_err(CoreError::store)?;

        Ok(StoreHit {
            document: document.unwrap_or_default(),
            collection_name: collection_name.unwrap_or_default(),
            distance,
        })
    }
}

/// pgvector accepts vectors as text literals such as `[1,0.5,-2]`.
fn to_vector_literal(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}

#[async_trait]
impl DocumentStore for PgVectorStore {
    async fn nearest(
        &self,
        embedding: &[f32],
        collection: Option<&str>,
        limit: usize,
    ) -> Result<Vec<StoreHit>, CoreError> {
        let vector = to_vector_literal(embedding);
        let limit = limit as i64;

        // Scoped to this call; returned to the pool on every exit path.
        let mut conn = self.pool.acquire().await.map_err(CoreError::store)?;

        let rows = match collection {
            Some(name) => {
                sqlx::query(NEAREST_IN_COLLECTION_SQL)
                    .bind(&vector)
                    .bind(name)
                    .bind(limit)
                    .fetch_all(&mut *conn)
                    .await
            }
            None => {
                sqlx::query(NEAREST_SQL)
                    .bind(&vector)
                    .bind(limit)
                    .fetch_all(&mut *conn)
                    .await
            }
        }
        .map_err(CoreError::store)?;

        rows.iter().map(Self::row_to_hit).collect()
    }

    async fn list_collections(&self) -> Result<Vec<String>, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(CoreError::store)?;
        let names: Vec<Option<String>> =
            sqlx::query_scalar("SELECT name FROM langchain_pg_collection")
                .fetch_all(&mut *conn)
                .await
                .map_err(CoreError::store)?;

        Ok(names.into_iter().flatten().collect())
    }

    async fn sample_collection(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Passage>, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(CoreError::store)?;
        let rows = sqlx::query(
            "SELECT e.document, c.name AS collection_name
             FROM langchain_pg_embedding e
             JOIN langchain_pg_collection c ON e.collection_id = c.uuid
             WHERE c.name = $1
             LIMIT $2",
        )
        .bind(collection)
        .bind(limit as i64)
        .fetch_all(&mut *conn)
        .await
        .map_err(CoreError::store)?;

        rows.iter()
            .map(|row| {
                let document: Option<String> =
                    row.try_get("document").map_err(CoreError::store)?;
                let collection_name: Option<String> =
                    row.try_get("collection_name").map_err(CoreError::store)?;
                Ok(Passage {
                    document: document.unwrap_or_default(),
                    collection_name: collection_name.unwrap_or_default(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_literal_matches_pgvector_text_format() {
        assert_eq!(to_vector_literal(&[1.0, 0.5, -2.0]), "[1,0.5,-2]");
        assert_eq!(to_vector_literal(&[]), "[]");
    }

    #[tokio::test]
    async fn unreachable_database_is_a_store_error() {
        let config = StoreConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..StoreConfig::default()
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .max_connections(1)
            .connect_lazy_with(
                PgConnectOptions::new()
                    .host(&config.host)
                    .port(config.port)
                    .username(&config.user),
            );
        let store = PgVectorStore::from_pool(pool);

        let err = store.list_collections().await.unwrap_err();
        assert!(matches!(err, CoreError::Store(_)));
    }

    /// Needs a database with the LangChain PGVector tables populated.
    #[tokio::test]
    #[ignore]
    async fn test_live_pgvector_roundtrip() {
        let url = std::env::var("DOCSAGE_TEST_DATABASE_URL")
            .expect("DOCSAGE_TEST_DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.unwrap();
        let store = PgVectorStore::from_pool(pool);

        let collections = store.list_collections().await.unwrap();
        println!("Collections found: {}", collections.len());

        if let Some(first) = collections.first() {
            let passages = store.sample_collection(first, 3).await.unwrap();
            assert!(passages.len() <= 3);
            assert!(passages.iter().all(|p| &p.collection_name == first));
        }
    }
}
