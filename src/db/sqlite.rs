use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use super::{Resource, StoreBackend, Table};
use crate::error::AppError;

/// Key-value tables in sqlite, one `<resource>_<namespace>` table per
/// resource so several deployments can share a database.
#[derive(Clone, Debug)]
pub struct SqliteBackend {
    pool: SqlitePool,
    namespace: String,
}

impl SqliteBackend {
    pub async fn connect(database_url: &str, namespace: &str) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Self::new(pool, namespace).await
    }

    pub async fn new(pool: SqlitePool, namespace: &str) -> Result<Self, AppError> {
        if namespace.is_empty()
            || !namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Config(format!(
                "STORE_NAMESPACE must be alphanumeric, got `{namespace}`"
            )));
        }

        let backend = Self {
            pool,
            namespace: namespace.to_string(),
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn table_name(&self, resource: Resource) -> String {
        format!("{}_{}", resource.as_str(), self.namespace)
    }

    async fn run_migrations(&self) -> Result<(), AppError> {
        for resource in Resource::ALL {
            let table = self.table_name(resource);
            sqlx::raw_sql(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    key TEXT NOT NULL,
                    field TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL DEFAULT (unixepoch()),
                    PRIMARY KEY (key, field)
                );
                "#
            ))
            .execute(&self.pool)
            .await?;
        }
        info!(namespace = %self.namespace, "🗄️ Key-value tables ready");
        Ok(())
    }
}

#[async_trait]
impl StoreBackend for SqliteBackend {
    async fn load(&self, resource: Resource) -> Result<Table, AppError> {
        let rows = sqlx::query_as::<_, (String, String, String)>(&format!(
            "SELECT key, field, value FROM {} ORDER BY key, field",
            self.table_name(resource)
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut table = Table::new();
        for (key, field, value) in rows {
            table
                .entry(key)
                .or_default()
                .insert(field, serde_json::from_str(&value)?);
        }
        Ok(table)
    }

    async fn persist(&self, resource: Resource, table: &Table) -> Result<(), AppError> {
        let name = self.table_name(resource);
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {name}"))
            .execute(&mut *tx)
            .await?;

        let insert = format!("INSERT INTO {name} (key, field, value) VALUES (?, ?, ?)");
        for (key, fields) in table {
            for (field, value) in fields {
                sqlx::query(&insert)
                    .bind(key)
                    .bind(field)
                    .bind(serde_json::to_string(value)?)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        tracing::trace!("[STORE::SQLITE] wrote {}", name);
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
