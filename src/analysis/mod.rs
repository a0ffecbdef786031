/// Per-storm organization of cleaned observations.
///
/// This module turns the flat row stream into one summary per storm.
/// Classification itself lives in `classify`; this is where its results
/// are combined with the track geometry.
///
/// Submodules:
/// - `grouping`: organizes cleaned rows into per-storm, time-ordered groups.
/// - `tracks`: builds one `StormTrack` summary per group.

pub mod grouping;
pub mod tracks;
