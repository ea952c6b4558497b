use sqlx::{PgPool, postgres::PgPoolOptions};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageInitError {
    #[error("missing DATABASE_URL in environment variables")]
    MissingConnectionString,
    #[error("invalid storage identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("storage connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("failed to prepare collection {collection}: {source}")]
    Bootstrap {
        collection: String,
        #[source]
        source: sqlx::Error,
    },
}

// Namespace and collection the account data lives in.
#[derive(Clone, Debug)]
pub struct StorageTarget {
    pub schema: String,
    pub table: String,
}

impl StorageTarget {
    fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

// Build a small PostgreSQL pool for the relay.
pub async fn connect_pool(database_url: Option<&str>) -> Result<PgPool, StorageInitError> {
    let database_url = database_url.ok_or(StorageInitError::MissingConnectionString)?;
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(StorageInitError::Connect)
}

/// Ensures the storage namespace and collection exist.
///
/// Returns `true` when the collection had to be created.
pub async fn ensure_collection(
    pool: &PgPool,
    target: &StorageTarget,
) -> Result<bool, StorageInitError> {
    validate_identifier(&target.schema)?;
    validate_identifier(&target.table)?;

    let bootstrap_error = |source: sqlx::Error| StorageInitError::Bootstrap {
        collection: target.qualified_name(),
        source,
    };

    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = $1 AND table_name = $2
        )
        "#,
    )
    .bind(&target.schema)
    .bind(&target.table)
    .fetch_one(pool)
    .await
    .map_err(bootstrap_error)?;

    if exists {
        return Ok(false);
    }

    // Identifiers are validated above; they cannot be bound as parameters.
    sqlx::query(&format!(r#"CREATE SCHEMA IF NOT EXISTS "{}""#, target.schema))
        .execute(pool)
        .await
        .map_err(bootstrap_error)?;
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{}"."{}" (
            id BIGSERIAL PRIMARY KEY,
            payload JSONB NOT NULL DEFAULT '{{}}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        target.schema, target.table
    ))
    .execute(pool)
    .await
    .map_err(bootstrap_error)?;

    Ok(true)
}

fn validate_identifier(name: &str) -> Result<(), StorageInitError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(StorageInitError::InvalidIdentifier(name.to_string()))
    }
}
