/// Groups cleaned observations into storms.
///
/// Groups are returned in ascending storm-id order so that everything
/// downstream (feature order inside a partition in particular) is stable
/// from run to run.

use std::collections::BTreeMap;

use crate::model::Observation;

/// All rows of one storm, ascending by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StormGroup {
    pub storm_id: String,
    pub rows: Vec<Observation>,
}

/// Groups rows by storm id and orders each group by timestamp.
///
/// The sort is stable: rows sharing a timestamp keep their input order.
pub fn group_by_storm(rows: Vec<Observation>) -> Vec<StormGroup> {
    let mut by_storm: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for row in rows {
        by_storm.entry(row.storm_id.clone()).or_default().push(row);
    }

    by_storm
        .into_iter()
        .map(|(storm_id, mut rows)| {
            rows.sort_by_key(|r| r.timestamp);
            StormGroup { storm_id, rows }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
