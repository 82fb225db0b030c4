//! Story script data model.

/// Segments and their validation.
pub mod model;
/// JSON script files.
pub mod script;
