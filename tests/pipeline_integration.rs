/// End-to-end tests for the partition build
///
/// These tests run the whole pipeline after retrieval: CSV text → parse →
/// clean → group → classify → partition → filesystem store. No network
/// access is needed; the CSV is built inline in IBTrACS layout.
///
/// Run with: cargo test --test pipeline_integration

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use stormtrack_service::config::ServiceConfig;
use stormtrack_service::ingest::ibtracs;
use stormtrack_service::model::{Basin, PartitionKey};
use stormtrack_service::partition::FeatureCollection;
use stormtrack_service::pipeline::{self, BuildReport};
use stormtrack_service::store::{ArtifactStore, FsStore};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const HEADER: &str =
    "SID,SEASON,NUMBER,BASIN,SUBBASIN,NAME,ISO_TIME,NATURE,LAT,LON,WMO_WIND,USA_ATCF_ID";
const UNITS: &str = " ,Year, , , , , , ,degrees_north,degrees_east,kts, ";

fn ibtracs_csv(rows: &[&str]) -> String {
    let mut text = format!("{}\n{}\n", HEADER, UNITS);
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn build(csv: &str, seasons: std::ops::RangeInclusive<i32>, allowed: &[Basin], dir: &Path) -> BuildReport {
    let raw = ibtracs::parse_observations(csv.as_bytes()).expect("CSV should parse");
    let mut store = FsStore::new(dir);
    pipeline::build_from_rows(raw, &seasons, allowed, &ServiceConfig::default(), &mut store)
        .expect("build should succeed")
}

fn read_partition(dir: &Path, season: i32, basin: Basin) -> FeatureCollection {
    let mut store = FsStore::new(dir);
    let body = store
        .get(&PartitionKey::new(season, basin))
        .unwrap()
        .unwrap_or_else(|| panic!("partition {} {} missing", basin, season));
    serde_json::from_str(&body).expect("artifact should be valid GeoJSON")
}

fn artifact_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// A mixed 2009-2010 sample covering each basin-inference tier.
fn sample_csv() -> String {
    ibtracs_csv(&[
        // textual vote: WP
        "2009215N20131,2009,5,WP,MM,MORAKOT,2009-08-03 06:00:00,TS,20.5,131.2,55,WP092009",
        "2009215N20131,2009,5,WP,MM,MORAKOT,2009-08-07 12:00:00,TS,23.5,123.0,80,WP092009",
        // identifier prefix: AL, no basin text
        "2009230N12300,2009,7, , ,BILL,2009-08-15 00:00:00,TS,12.0,-40.0,30,AL032009",
        "2009230N12300,2009,7, , ,BILL,2009-08-19 00:00:00,TS,25.0,-60.0,115,AL032009",
        // identifier prefix SH, median longitude 55 → SI
        "2010030S15055,2010,2, , ,EDZANI,2010-01-30 00:00:00,TS,-15.0,55.0,60,SH082010",
        // coordinate fallback, southern hemisphere at 170E → SP
        "2010060S20170,2010,3, , ,TOMAS,2010-03-10 00:00:00,TS,-20.0,170.0,,",
        // outside the season range
        "2008100N10140,2008,1,WP,MM,NEOGURI,2008-04-15 00:00:00,TS,10.0,140.0,45,WP012008",
        // malformed: no position
        "2009300N10140,2009,9,WP,MM,MIRINAE,2009-10-27 00:00:00,TS,,,70,WP232009",
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_single_storm_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv = ibtracs_csv(&[
        "S1,2009,1, , ,ALPHA,2009-08-01 00:00:00,TS,10,140,10,WP012009",
        "S1,2009,1, , ,ALPHA,2009-08-01 06:00:00,TS,10,140,50,WP012009",
        "S1,2009,1, , ,ALPHA,2009-08-01 12:00:00,TS,10,140,70,WP012009",
    ]);

    let report = build(&csv, 2009..=2009, &Basin::ALL, dir.path());
    assert_eq!(report.storms, 1);
    assert_eq!(
        artifact_names(dir.path()),
        BTreeSet::from(["wp_2009.geojson".to_string()])
    );

    let collection = read_partition(dir.path(), 2009, Basin::WestPacific);
    assert_eq!(collection.kind, "FeatureCollection");
    assert_eq!(collection.features.len(), 1);

    let props = &collection.features[0].properties;
    assert_eq!(props.id, "S1");
    assert_eq!(props.name, "Alpha");
    assert_eq!(props.basin, "WP");
    assert_eq!(props.season, 2009);
    assert_eq!(props.peak_wind_ms, Some(36.0));
    assert_eq!(props.category.as_deref(), Some("severe typhoon"));
    assert_eq!(props.start, "2009-08-01T00:00:00+00:00");
    assert_eq!(props.end, "2009-08-01T12:00:00+00:00");
    assert_eq!(
        collection.features[0].geometry.coordinates,
        vec![[140.0, 10.0], [140.0, 10.0], [140.0, 10.0]]
    );
}

#[test]
fn test_every_storm_lands_in_exactly_one_partition() {
    let dir = tempfile::tempdir().unwrap();
    let report = build(&sample_csv(), 2009..=2010, &Basin::ALL, dir.path());

    assert_eq!(report.load.malformed, 2); // units row + missing position
    assert_eq!(report.load.out_of_range, 1);
    assert_eq!(report.storms, 4);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.partitions.total_storms(), 4);

    assert_eq!(
        artifact_names(dir.path()),
        BTreeSet::from([
            "na_2009.geojson".to_string(),
            "wp_2009.geojson".to_string(),
            "si_2010.geojson".to_string(),
            "sp_2010.geojson".to_string(),
        ])
    );
    assert_eq!(
        report.partitions.season_lines(),
        vec!["2009 -> NA:1, WP:1", "2010 -> SI:1, SP:1"]
    );

    let mut seen = Vec::new();
    for key in report.partitions.counts.keys() {
        let collection = read_partition(dir.path(), key.season, key.basin);
        for feature in collection.features {
            assert_eq!(feature.properties.basin, key.basin.code());
            seen.push(feature.properties.id);
        }
    }
    seen.sort();
    assert_eq!(
        seen,
        vec!["2009215N20131", "2009230N12300", "2010030S15055", "2010060S20170"]
    );
}

#[test]
fn test_storm_without_wind_is_still_written() {
    let dir = tempfile::tempdir().unwrap();
    build(&sample_csv(), 2010..=2010, &Basin::ALL, dir.path());

    let collection = read_partition(dir.path(), 2010, Basin::SouthPacific);
    let props = &collection.features[0].properties;
    assert_eq!(props.name, "Tomas");
    assert_eq!(props.peak_wind_ms, None);
    assert_eq!(props.category, None);
}

#[test]
fn test_allow_list_skips_other_basins() {
    let dir = tempfile::tempdir().unwrap();
    let report = build(&sample_csv(), 2009..=2010, &[Basin::WestPacific], dir.path());

    assert_eq!(report.storms, 4);
    assert_eq!(report.skipped, 3);
    assert_eq!(
        artifact_names(dir.path()),
        BTreeSet::from(["wp_2009.geojson".to_string()])
    );
}

#[test]
fn test_rebuild_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    build(&sample_csv(), 2009..=2010, &Basin::ALL, dir.path());
    let first = fs::read(dir.path().join("wp_2009.geojson")).unwrap();

    build(&sample_csv(), 2009..=2010, &Basin::ALL, dir.path());
    let second = fs::read(dir.path().join("wp_2009.geojson")).unwrap();

    assert_eq!(first, second);
    let collection = read_partition(dir.path(), 2009, Basin::WestPacific);
    assert_eq!(collection.features.len(), 1, "rebuild must not append");
}

#[test]
fn test_rebuild_replaces_stale_artifact() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("wp_2009.geojson"),
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"LineString","coordinates":[]},"properties":{"id":"OLD"}}]}"#,
    )
    .unwrap();

    build(&sample_csv(), 2009..=2009, &Basin::ALL, dir.path());

    let collection = read_partition(dir.path(), 2009, Basin::WestPacific);
    let ids: Vec<&str> = collection.features.iter().map(|f| f.properties.id.as_str()).collect();
    assert_eq!(ids, vec!["2009215N20131"]);
}

#[test]
fn test_textual_basin_beats_identifier() {
    let dir = tempfile::tempdir().unwrap();
    // basin text says EP; identifier and coordinates both point elsewhere
    let csv = ibtracs_csv(&[
        "S9,2009,1,EP,MM,ODD,2009-07-01 00:00:00,TS,15,140,40,AL012009",
        "S9,2009,1,EP,MM,ODD,2009-07-01 06:00:00,TS,15,141,45,AL012009",
    ]);
    build(&csv, 2009..=2009, &Basin::ALL, dir.path());

    let collection = read_partition(dir.path(), 2009, Basin::EastPacific);
    assert_eq!(collection.features.len(), 1);
    assert_eq!(
        collection.features[0].properties.category.as_deref(),
        Some("mild typhoon")
    );
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("ibtracs.csv");
    fs::write(&csv_path, sample_csv()).unwrap();

    let raw = ibtracs::load_observations(&csv_path).unwrap();
    assert_eq!(raw.len(), 9);
}
