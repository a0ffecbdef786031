/// Integration tests for the PostgreSQL partition store
///
/// Prerequisites:
/// - PostgreSQL running and reachable
/// - DATABASE_URL set in .env (the store creates its own schema)
///
/// Run with: cargo test --test postgres_store -- --ignored --test-threads=1

use stormtrack_service::config;
use stormtrack_service::model::{Basin, PartitionKey};
use stormtrack_service::query::{QueryRequest, query_partitions};
use stormtrack_service::store::{ArtifactStore, PgStore};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn get_test_store() -> PgStore {
    let url = config::database_url().unwrap_or_else(|e| {
        eprintln!("\n{}\n", "=".repeat(80));
        eprintln!("INTEGRATION TEST SETUP ERROR: {}", e);
        eprintln!("{}\n", "=".repeat(80));
        panic!("DATABASE_URL must be set");
    });
    PgStore::connect(&url).expect("Failed to connect to PostgreSQL")
}

// Season far outside IBTrACS coverage so real partitions are never touched.
const TEST_SEASON: i32 = 1;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn test_put_replaces_row() {
    let mut store = get_test_store();
    let key = PartitionKey::new(TEST_SEASON, Basin::WestPacific);
    store.delete(&key).unwrap();

    store.put(&key, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
    store.put(&key, r#"{"type":"FeatureCollection","features":[ ]}"#).unwrap();

    let body = store.get(&key).unwrap().expect("row should exist");
    assert_eq!(body, r#"{"type":"FeatureCollection","features":[ ]}"#);

    assert_eq!(store.delete(&key).unwrap(), 1);
    assert_eq!(store.get(&key).unwrap(), None);
}

#[test]
#[ignore]
fn test_query_over_postgres_store() {
    let mut store = get_test_store();
    let key = PartitionKey::new(TEST_SEASON, Basin::NorthAtlantic);
    store
        .put(
            &key,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"LineString","coordinates":[[-60.0,20.0]]},"properties":{"id":"T1","basin":"NA","category":"severe typhoon"}}]}"#,
        )
        .unwrap();

    let request = QueryRequest {
        season: Some(TEST_SEASON.to_string()),
        basins: vec!["NA".to_string()],
        categories: vec!["severe typhoon".to_string()],
    };
    let response = query_partitions(&mut store, &request).unwrap();
    assert_eq!(response.debug.count, 1);

    store.delete(&key).unwrap();
}
