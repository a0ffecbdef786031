/// Per-storm classifiers.
///
/// Submodules:
/// - `basin`: tiered basin inference, always yields one of the seven codes.
/// - `intensity`: peak wind conversion and category grading.

pub mod basin;
pub mod intensity;
