use schemalift_core::SchemaModel;

use crate::error::{AccessorError, Result};

/// Fail on the first table the schema would create that already exists.
///
/// Comparison ignores case. Only an empty overlap is supported; colliding
/// tables must be removed by hand before retrying.
pub fn validate_table_overlap(schema: &SchemaModel, existing: &[String]) -> Result<()> {
    let existing: Vec<String> = existing.iter().map(|name| name.to_lowercase()).collect();

    for name in schema.table_names() {
        let lower = name.to_lowercase();
        if existing.iter().any(|candidate| *candidate == lower) {
            return Err(AccessorError::TableCollision {
                table: name.to_string(),
            });
        }
    }

    Ok(())
}
