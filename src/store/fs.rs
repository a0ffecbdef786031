//! Filesystem partition store: one `<address>.geojson` file per partition.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ArtifactStore, StoreError};
use crate::model::PartitionKey;

pub const ARTIFACT_EXTENSION: &str = "geojson";

#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &PartitionKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}", key.address(), ARTIFACT_EXTENSION))
    }
}

impl ArtifactStore for FsStore {
    /// Writes to a temp file in the same directory, then renames over the
    /// target so readers never see a half-written artifact.
    fn put(&mut self, key: &PartitionKey, body: &str) -> Result<(), StoreError> {
        let address = key.address();
        let io_err = |source: std::io::Error| StoreError::Io {
            address: address.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let target = self.path_for(key);
        let partial = target.with_extension(format!("{}.tmp", ARTIFACT_EXTENSION));
        fs::write(&partial, body).map_err(io_err)?;
        fs::rename(&partial, &target).map_err(io_err)?;
        Ok(())
    }

    fn get(&mut self, key: &PartitionKey) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                address: key.address(),
                source,
            }),
        }
    }
}
