//! Key-value storage for partition artifacts.
//!
//! Every artifact is addressed by its `PartitionKey` and replaced wholesale
//! on each write; nothing is ever merged or appended.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::PartitionKey;

pub mod fs;
pub mod pg;

pub use fs::FsStore;
pub use pg::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on '{address}': {source}")]
    Io {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] postgres::Error),

    #[error("failed to encode artifact: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("parse error in {address}: {message}")]
    Corrupt { address: String, message: String },
}

pub trait ArtifactStore {
    /// Replaces whatever is stored under `key` with `body`.
    fn put(&mut self, key: &PartitionKey, body: &str) -> Result<(), StoreError>;

    /// Returns the stored body, or `None` if the partition was never built.
    fn get(&mut self, key: &PartitionKey) -> Result<Option<String>, StoreError>;
}

/// In-process store, keyed by address.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactStore for MemoryStore {
    fn put(&mut self, key: &PartitionKey, body: &str) -> Result<(), StoreError> {
        self.artifacts.insert(key.address(), body.to_string());
        Ok(())
    }

    fn get(&mut self, key: &PartitionKey) -> Result<Option<String>, StoreError> {
        Ok(self.artifacts.get(&key.address()).cloned())
    }
}
