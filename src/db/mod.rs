//! Session and profile persistence.
//!
//! Both resources map a key to a flat field map. Every update is applied in
//! memory first and then the whole resource is written to the backend.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Debug};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::StoreConfig;
use crate::error::AppError;

mod file;
mod models;
mod sqlite;

pub use file::FileBackend;
pub use models::{ProfileRecord, SessionRecord};
pub use sqlite::SqliteBackend;

pub type Fields = BTreeMap<String, Value>;
pub type Table = BTreeMap<String, Fields>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Session,
    Profile,
}

impl Resource {
    pub const ALL: [Resource; 2] = [Resource::Session, Resource::Profile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resource snapshot is loaded from and written to.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Full snapshot of a resource, empty when it was never persisted.
    async fn load(&self, resource: Resource) -> Result<Table, AppError>;

    /// Replace the persisted resource with `table`.
    async fn persist(&self, resource: Resource, table: &Table) -> Result<(), AppError>;

    async fn close(&self) {}
}

#[derive(Debug)]
pub struct Store {
    backend: Box<dyn StoreBackend>,
    tables: Mutex<HashMap<Resource, Table>>,
}

impl Store {
    pub async fn open(config: &StoreConfig) -> Result<Self, AppError> {
        let backend: Box<dyn StoreBackend> = match config {
            StoreConfig::File { dir } => Box::new(FileBackend::new(dir.clone())),
            StoreConfig::Sqlite {
                database_url,
                namespace,
            } => Box::new(SqliteBackend::connect(database_url, namespace).await?),
        };

        Self::with_backend(backend).await
    }

    pub async fn with_backend(backend: Box<dyn StoreBackend>) -> Result<Self, AppError> {
        let mut tables = HashMap::new();
        for resource in Resource::ALL {
            let table = backend.load(resource).await?;
            debug!(%resource, entries = table.len(), "Resource loaded");
            tables.insert(resource, table);
        }
        info!(?backend, "🗄️ Store opened");

        Ok(Self {
            backend,
            tables: Mutex::new(tables),
        })
    }

    /// Snapshot of a whole resource.
    pub async fn get(&self, resource: Resource) -> Table {
        self.tables
            .lock()
            .await
            .get(&resource)
            .cloned()
            .unwrap_or_default()
    }

    /// Set one field of `key` and persist the resource.
    pub async fn update(
        &self,
        resource: Resource,
        key: &str,
        field: &str,
        value: Value,
    ) -> Result<(), AppError> {
        self.update_fields(resource, key, Fields::from([(field.to_string(), value)]))
            .await
    }

    /// Upsert several fields of `key` with a single write.
    pub async fn update_fields(
        &self,
        resource: Resource,
        key: &str,
        fields: Fields,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        let table = tables.entry(resource).or_default();
        table.entry(key.to_string()).or_default().extend(fields);

        self.write(resource, table).await
    }

    /// Create an empty entry for `key` unless one exists. Returns whether an
    /// entry was created.
    pub async fn ensure(&self, resource: Resource, key: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let table = tables.entry(resource).or_default();
        if table.contains_key(key) {
            return Ok(false);
        }
        table.insert(key.to_string(), Fields::new());

        self.write(resource, table).await?;
        Ok(true)
    }

    /// Persist `snapshot`. Callers hold the tables lock, so snapshots reach
    /// the backend in the order they were taken. The in-memory update is
    /// kept even if this fails.
    async fn write(&self, resource: Resource, snapshot: &Table) -> Result<(), AppError> {
        self.backend.persist(resource, snapshot).await.map_err(|e| {
            error!(%resource, error = %e, "🗄️ ❌ Failed to persist resource");
            e
        })
    }

    async fn record<T: DeserializeOwned>(
        &self,
        resource: Resource,
        key: &str,
    ) -> Result<Option<T>, AppError> {
        let fields = self
            .tables
            .lock()
            .await
            .get(&resource)
            .and_then(|table| table.get(key))
            .cloned();

        fields.map(decode).transpose()
    }

    pub async fn session(&self, user: &str) -> Result<Option<SessionRecord>, AppError> {
        self.record(Resource::Session, user).await
    }

    pub async fn profile(&self, account_id: u32) -> Result<Option<ProfileRecord>, AppError> {
        self.record(Resource::Profile, &account_id.to_string()).await
    }

    pub async fn close(&self) {
        self.backend.close().await;
    }
}

fn decode<T: DeserializeOwned>(fields: Fields) -> Result<T, AppError> {
    Ok(serde_json::from_value(Value::Object(
        fields.into_iter().collect(),
    ))?)
}
