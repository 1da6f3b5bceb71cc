use anyhow::{Context, Result};
use pgvector::Vector;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::{NewPassage, Passage, ScoredPassage};

/// pgvector-backed passage table queried by cosine distance.
pub struct PgVectorStore {
    pool: PgPool,
    table: String,
    dimensions: usize,
}

impl PgVectorStore {
    /// Connects and creates the extension and table if they are missing.
    pub async fn connect(database_url: &str, table: &str, dimensions: usize) -> Result<Self> {
        validate_table_name(table)?;

        let pool = PgPool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to PostgreSQL at {}", database_url))?;

        let store = Self {
            pool,
            table: table.to_string(),
            dimensions,
        };
        store.ensure_schema().await?;

        tracing::info!(
            table = %store.table,
            dimensions,
            "pgvector store ready"
        );
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .context("Failed to enable pgvector extension")?;

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id UUID PRIMARY KEY,
                source TEXT NOT NULL,
                position INTEGER NOT NULL,
                body TEXT NOT NULL,
                embedding vector({dims}) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (source, position)
            )",
            table = self.table,
            dims = self.dimensions
        );
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to create table {}", self.table))?;

        // Tables created before the constraint existed pick it up here.
        sqlx::query(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {table}_source_position ON {table} (source, position)",
            table = self.table
        ))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to index {} by source and position", self.table))?;

        Ok(())
    }

    fn check_dimensions(&self, what: &str, len: usize) -> Result<()> {
        if len != self.dimensions {
            anyhow::bail!(
                "{} has {} dimensions, table {} expects {}",
                what,
                len,
                self.table,
                self.dimensions
            );
        }
        Ok(())
    }

    fn upsert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (id, source, position, body, embedding, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (source, position) DO UPDATE
             SET id = EXCLUDED.id, body = EXCLUDED.body,
                 embedding = EXCLUDED.embedding, created_at = EXCLUDED.created_at",
            self.table
        )
    }

    /// Stores a passage, replacing any passage already at the same source and position.
    pub async fn insert_passage(&self, new: NewPassage) -> Result<Passage> {
        self.check_dimensions("Passage embedding", new.embedding.len())?;
        let passage = new.stamp();

        upsert_query(&self.upsert_sql(), &passage)
            .execute(&self.pool)
            .await
            .with_context(|| {
                format!(
                    "Failed to insert passage {} of {}",
                    passage.position, passage.source
                )
            })?;

        Ok(passage)
    }

    /// Atomically swaps every stored passage of `source` for `passages`.
    pub async fn replace_source(
        &self,
        source: &str,
        passages: Vec<NewPassage>,
    ) -> Result<Vec<Passage>> {
        for new in &passages {
            self.check_dimensions("Passage embedding", new.embedding.len())?;
        }
        let passages: Vec<Passage> = passages.into_iter().map(NewPassage::stamp).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        let removed = sqlx::query(&format!("DELETE FROM {} WHERE source = $1", self.table))
            .bind(source)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to remove passages of {}", source))?
            .rows_affected();

        let sql = self.upsert_sql();
        for passage in &passages {
            upsert_query(&sql, passage)
                .execute(&mut *tx)
                .await
                .with_context(|| {
                    format!("Failed to insert passage {} of {}", passage.position, source)
                })?;
        }

        tx.commit()
            .await
            .with_context(|| format!("Failed to commit passages of {}", source))?;

        tracing::debug!(source, removed, stored = passages.len(), "replaced source passages");
        Ok(passages)
    }

    pub async fn search_similar(
        &self,
        query_embedding: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPassage>> {
        self.check_dimensions("Query embedding", query_embedding.len())?;

        let sql = format!(
            "SELECT id, source, position, body, embedding, created_at,
                    1 - (embedding <=> $1) AS similarity
             FROM {}
             ORDER BY embedding <=> $1, created_at
             LIMIT $2",
            self.table
        );
        let rows = sqlx::query(&sql)
            .bind(Vector::from(query_embedding))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .context("Failed to execute similarity search")?;

        let scored = rows
            .iter()
            .map(|row| -> Result<ScoredPassage> {
                let similarity: f64 = row.try_get("similarity")?;
                Ok(ScoredPassage {
                    passage: passage_from_row(row)?,
                    similarity: similarity as f32,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(hits = scored.len(), "similarity search finished");
        Ok(scored)
    }

    pub async fn passage_count(&self) -> Result<i64> {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS count FROM {}", self.table))
            .fetch_one(&self.pool)
            .await
            .context("Failed to count passages")?;

        Ok(row.try_get("count")?)
    }
}

fn upsert_query<'q>(
    sql: &'q str,
    passage: &'q Passage,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(sql)
        .bind(passage.id)
        .bind(&passage.source)
        .bind(passage.position as i32)
        .bind(&passage.text)
        .bind(Vector::from(passage.embedding.clone()))
        .bind(passage.created_at)
}

fn passage_from_row(row: &PgRow) -> Result<Passage> {
    let embedding: Vector = row.try_get("embedding")?;
    Ok(Passage {
        id: row.try_get("id")?,
        source: row.try_get("source")?,
        position: row.try_get::<i32, _>("position")? as usize,
        text: row.try_get("body")?,
        embedding: embedding.to_vec(),
        created_at: row.try_get("created_at")?,
    })
}

/// Table names are interpolated into SQL, so only plain identifiers are accepted.
pub(crate) fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        anyhow::bail!("Invalid vector store table name: '{}'", table)
    }
}
