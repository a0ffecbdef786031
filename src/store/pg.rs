//! PostgreSQL partition store.
//!
//! One row per partition in `stormtrack.partitions`. Writes upsert the whole
//! row, so a rebuilt partition replaces the previous body outright.

use chrono::Utc;
use postgres::{Client, NoTls};

use super::{ArtifactStore, StoreError};
use crate::model::PartitionKey;

const CREATE_SCHEMA: &str = "
    CREATE SCHEMA IF NOT EXISTS stormtrack;
    CREATE TABLE IF NOT EXISTS stormtrack.partitions (
        address     TEXT PRIMARY KEY,
        season      INTEGER NOT NULL,
        basin       TEXT NOT NULL,
        body        TEXT NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    );
";

pub struct PgStore {
    client: Client,
}

impl PgStore {
    /// Connects and makes sure the partitions table exists.
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let mut client = Client::connect(database_url, NoTls)?;
        client.batch_execute(CREATE_SCHEMA)?;
        Ok(Self { client })
    }

    /// Removes one partition. Used to reset fixtures in integration tests.
    pub fn delete(&mut self, key: &PartitionKey) -> Result<u64, StoreError> {
        let removed = self.client.execute(
            "DELETE FROM stormtrack.partitions WHERE address = $1",
            &[&key.address()],
        )?;
        Ok(removed)
    }
}

impl ArtifactStore for PgStore {
    fn put(&mut self, key: &PartitionKey, body: &str) -> Result<(), StoreError> {
        self.client.execute(
            "INSERT INTO stormtrack.partitions (address, season, basin, body, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (address) DO UPDATE
             SET season = EXCLUDED.season,
                 basin = EXCLUDED.basin,
                 body = EXCLUDED.body,
                 updated_at = EXCLUDED.updated_at",
            &[
                &key.address(),
                &key.season,
                &key.basin.code(),
                &body,
                &Utc::now(),
            ],
        )?;
        Ok(())
    }

    fn get(&mut self, key: &PartitionKey) -> Result<Option<String>, StoreError> {
        let row = self.client.query_opt(
            "SELECT body FROM stormtrack.partitions WHERE address = $1",
            &[&key.address()],
        )?;
        Ok(row.map(|r| r.get(0)))
    }
}
