use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use tempfile::NamedTempFile;
use tokio::fs;

use super::{Resource, StoreBackend, Table};
use crate::error::AppError;

/// One lz4-compressed JSON file per resource.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, resource: Resource) -> PathBuf {
        self.dir.join(format!("{}.json.lz4", resource.as_str()))
    }
}

#[async_trait]
impl StoreBackend for FileBackend {
    async fn load(&self, resource: Resource) -> Result<Table, AppError> {
        let compressed = match fs::read(self.path(resource)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Table::new()),
            Err(e) => return Err(e.into()),
        };

        let raw = decompress_size_prepended(&compressed)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn persist(&self, resource: Resource, table: &Table) -> Result<(), AppError> {
        let raw = serde_json::to_vec(table)?;
        let compressed = compress_prepend_size(&raw);

        let dir = self.dir.clone();
        let path = self.path(resource);
        tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &compressed))
            .await
            .map_err(|e| AppError::Io(std::io::Error::other(e)))??;

        tracing::trace!("[STORE::FILE] wrote {}", self.path(resource).display());
        Ok(())
    }
}

/// Write to a uniquely named file next to `path`, then rename it over `path`
/// so readers never see a truncated file.
fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
