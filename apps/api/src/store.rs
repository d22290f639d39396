//! Ephemeral output directory for rendered portfolios.
//!
//! Files are named `<uuid>.<md|html|pdf>`. Ids are generated fresh per render,
//! so concurrent writers never share a path. Nothing is ever expired here.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::format::OutputFormat;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A stored file located by id.
#[derive(Debug)]
pub struct StoredPortfolio {
    pub id: Uuid,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl StoredPortfolio {
    pub fn download_name(&self) -> String {
        format!("portfolio_{}.{}", self.id, self.format.extension())
    }
}

#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    /// Opens (and creates if needed) the output directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn new_id() -> Uuid {
        Uuid::new_v4()
    }

    fn path_for(&self, id: Uuid, format: OutputFormat) -> PathBuf {
        self.dir.join(format!("{id}.{}", format.extension()))
    }

    pub async fn save(&self, id: Uuid, format: OutputFormat, contents: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(id, format);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("Stored {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }

    /// Reads one specific format of a stored portfolio. Ids that are not
    /// UUIDs never match a file.
    pub async fn read(&self, id: &str, format: OutputFormat) -> Result<Option<StoredPortfolio>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let path = self.path_for(id, format);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(StoredPortfolio { id, format, bytes })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// The first stored format for `id`, checked in Markdown, HTML, PDF order.
    pub async fn find(&self, id: &str) -> Result<Option<StoredPortfolio>, StoreError> {
        for format in OutputFormat::ALL {
            if let Some(stored) = self.read(id, format).await? {
                return Ok(Some(stored));
            }
        }
        Ok(None)
    }
}
