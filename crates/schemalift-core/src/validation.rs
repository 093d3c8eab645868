use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::graph::build_interleave_order;
use crate::schema::SchemaModel;

/// Validate internal consistency of a schema model.
///
/// This checks:
/// - table names are unique ignoring case
/// - duplicate columns
/// - primary key columns exist
/// - foreign key columns and referenced targets exist
/// - interleave parents exist and do not form a cycle
pub fn validate_schema(schema: &SchemaModel) -> Result<()> {
    let mut names: BTreeMap<String, &str> = BTreeMap::new();
    let mut catalog: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for (id, table) in &schema.tables {
        if id != &table.id {
            return Err(Error::InvalidSchema(format!(
                "table {} is stored under id {id}",
                table.id
            )));
        }

        if let Some(previous) = names.insert(table.name.to_lowercase(), &table.name) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {} and {}",
                previous, table.name
            )));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name: {}.{}",
                    table.name, column.name
                )));
            }
        }

        catalog.insert(id.as_str(), columns);
    }

    for table in schema.tables.values() {
        let columns = catalog.get(table.id.as_str()).ok_or_else(|| {
            Error::InvalidSchema(format!("missing table in catalog: {}", table.name))
        })?;

        if table.primary_key.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "table has no primary key: {}",
                table.name
            )));
        }

        for column in &table.primary_key {
            if !columns.contains(column.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "primary key column not found: {}.{}",
                    table.name, column
                )));
            }
        }

        for fk in &table.foreign_keys {
            for column in &fk.columns {
                if !columns.contains(column.as_str()) {
                    return Err(Error::InvalidSchema(format!(
                        "foreign key column not found: {}.{}",
                        table.name, column
                    )));
                }
            }

            let ref_columns = catalog.get(fk.referenced_table.as_str()).ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "referenced table not found: {} (from {})",
                    fk.referenced_table, table.name
                ))
            })?;

            if fk.columns.len() != fk.referenced_columns.len() {
                return Err(Error::InvalidSchema(format!(
                    "foreign key column count mismatch on {}: {} vs {}",
                    table.name,
                    fk.columns.len(),
                    fk.referenced_columns.len()
                )));
            }

            for column in &fk.referenced_columns {
                if !ref_columns.contains(column.as_str()) {
                    return Err(Error::InvalidSchema(format!(
                        "referenced column not found: {}.{}",
                        fk.referenced_table, column
                    )));
                }
            }
        }

        if let Some(interleave) = &table.interleave {
            if !schema.tables.contains_key(&interleave.parent) {
                return Err(Error::InvalidSchema(format!(
                    "interleave parent not found: {} (from {})",
                    interleave.parent, table.name
                )));
            }
        }
    }

    if let Some(cycle) = build_interleave_order(&schema.tables).cycle {
        return Err(Error::InvalidSchema(format!(
            "interleave cycle between tables: {}",
            cycle.join(", ")
        )));
    }

    Ok(())
}
