//! Identifier handling for statement templates.
//!
//! Collection and field names are the only text ever embedded into SQL. Both have already
//! passed the allow-list before reaching this module; quoting here keeps names that collide
//! with SQL keywords (a collection called `order`, say) usable as table names.

use docbin_core::query::FieldName;

/// Quotes a name as an SQL identifier.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds the JSON path selecting a top-level payload field.
pub(crate) fn json_path(field: &FieldName) -> String {
    format!("$.{}", field.as_str())
}
