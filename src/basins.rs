/// Basin registry for the storm track cache service.
///
/// Defines the canonical list of ocean basins a storm can be filed under,
/// along with display metadata used by the build log and the `basins`
/// listing.

use crate::model::Basin;
use crate::logging::{self, Stage};

// ---------------------------------------------------------------------------
// Basin metadata
// ---------------------------------------------------------------------------

/// Display metadata for a single basin.
pub struct BasinInfo {
    pub basin: Basin,
    /// Official IBTrACS basin name.
    pub name: &'static str,
    /// Which agencies' best tracks dominate the basin and how it is bounded.
    pub description: &'static str,
}

impl BasinInfo {
    /// Short form for log lines: `WP (Western North Pacific)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.basin.code(), self.name)
    }

    /// One registry line for the `basins` listing.
    pub fn summary_line(&self) -> String {
        format!("{}  {:<22} {}", self.basin.code(), self.name, self.description)
    }
}

/// Registry labels for a set of basins, in the given order.
pub fn describe_basins(basins: &[Basin]) -> Vec<String> {
    basins
        .iter()
        .filter_map(|b| find_basin(b.code()))
        .map(BasinInfo::label)
        .collect()
}

/// All basins known to IBTrACS, in code order.
///
/// Sources:
///   - Codes and names: IBTrACS v04 technical documentation (ncei.noaa.gov)
pub static BASIN_REGISTRY: &[BasinInfo] = &[
    BasinInfo {
        basin: Basin::CentralPacific,
        name: "Central North Pacific",
        description: "Between 140W and the dateline north of the equator. \
                      Tracked by CPHC; IBTrACS usually files these storms \
                      under EP with a CP subbasin.",
    },
    BasinInfo {
        basin: Basin::EastPacific,
        name: "Eastern North Pacific",
        description: "East of the dateline north of the equator, NHC area of \
                      responsibility.",
    },
    BasinInfo {
        basin: Basin::NorthAtlantic,
        name: "North Atlantic",
        description: "Includes the Caribbean Sea and Gulf of Mexico.",
    },
    BasinInfo {
        basin: Basin::NorthIndian,
        name: "North Indian",
        description: "Bay of Bengal and Arabian Sea. ATCF identifiers use the \
                      IO prefix.",
    },
    BasinInfo {
        basin: Basin::SouthIndian,
        name: "South Indian",
        description: "South of the equator, roughly 20E to 135E. Shares the \
                      SH identifier prefix with the South Pacific.",
    },
    BasinInfo {
        basin: Basin::SouthPacific,
        name: "South Pacific",
        description: "South of the equator, east of 135E.",
    },
    BasinInfo {
        basin: Basin::WestPacific,
        name: "Western North Pacific",
        description: "West of the dateline north of the equator, including \
                      the South China Sea.",
    },
];

/// Returns all basin codes, suitable as the default allow-list.
pub fn all_basin_codes() -> Vec<&'static str> {
    BASIN_REGISTRY.iter().map(|b| b.basin.code()).collect()
}

/// Looks up a basin by code (case-insensitive). Returns `None` if not found.
pub fn find_basin(code: &str) -> Option<&'static BasinInfo> {
    let basin = Basin::from_code(code)?;
    BASIN_REGISTRY.iter().find(|b| b.basin == basin)
}

/// Resolves a user-supplied allow-list into basins.
///
/// Entries are case-insensitive. Unknown entries are dropped with a warning;
/// duplicates collapse. Returns `None` when nothing valid remains, which the
/// caller must treat as a fatal argument error.
pub fn parse_allow_list<S: AsRef<str>>(entries: &[S]) -> Option<Vec<Basin>> {
    let mut allowed: Vec<Basin> = Vec::new();
    for entry in entries {
        match Basin::from_code(entry.as_ref()) {
            Some(basin) => {
                if !allowed.contains(&basin) {
                    allowed.push(basin);
                }
            }
            None => logging::warn(
                Stage::System,
                None,
                &format!("ignoring unknown basin code '{}'", entry.as_ref()),
            ),
        }
    }
    allowed.sort();

    if allowed.is_empty() {
        None
    } else {
        Some(allowed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_basin_once() {
        assert_eq!(BASIN_REGISTRY.len(), Basin::ALL.len());
        for basin in Basin::ALL {
            let hits = BASIN_REGISTRY.iter().filter(|b| b.basin == basin).count();
            assert_eq!(hits, 1, "{} should appear exactly once", basin);
        }
    }

    #[test]
    fn test_find_basin_is_case_insensitive() {
        let info = find_basin("wp").expect("WP should be registered");
        assert_eq!(info.name, "Western North Pacific");
        assert!(find_basin("XX").is_none());
    }

    #[test]
    fn test_labels_use_registry_names() {
        assert_eq!(
            describe_basins(&[Basin::NorthAtlantic, Basin::WestPacific]),
            vec!["NA (North Atlantic)", "WP (Western North Pacific)"]
        );
    }

    #[test]
    fn test_summary_line() {
        let line = find_basin("sp").unwrap().summary_line();
        assert_eq!(
            line,
            "SP  South Pacific          South of the equator, east of 135E."
        );
    }

    #[test]
    fn test_allow_list_keeps_valid_codes_only() {
        let allowed = parse_allow_list(&["wp", "NA", "zz", "WP"]).unwrap();
        assert_eq!(allowed, vec![Basin::NorthAtlantic, Basin::WestPacific]);
    }

    #[test]
    fn test_allow_list_with_no_valid_codes_is_rejected() {
        assert!(parse_allow_list(&["XX", "MM"]).is_none());
        assert!(parse_allow_list::<&str>(&[]).is_none());
    }

    #[test]
    fn test_default_allow_list_is_all_seven() {
        let allowed = parse_allow_list(&all_basin_codes()).unwrap();
        assert_eq!(allowed, Basin::ALL.to_vec());
    }
}
