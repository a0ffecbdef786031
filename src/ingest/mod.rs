/// Raw data ingestion.
///
/// Submodules:
/// - `ibtracs`: IBTrACS CSV download, parsing and row cleaning.

pub mod ibtracs;
