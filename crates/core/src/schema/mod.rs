//! Schema module.
//!
//! Column descriptors and table schemas as reported by the remote side.

mod column;
mod table;

pub use column::Column;
pub use table::{is_identifier, validate_identifier, TableSchema};
