//! DDL text generation from a [`SchemaModel`](crate::SchemaModel).
//!
//! Rendering is pure: the same config and model always produce the same
//! ordered statements. Sequences come first, then tables in interleave
//! order, then one `ALTER TABLE ... ADD FOREIGN KEY` per foreign key.

use std::collections::BTreeMap;

use crate::constraints::{FkAction, ForeignKey};
use crate::dialect::Dialect;
use crate::graph::table_order;
use crate::schema::{Column, Table};
use crate::types::{BaseType, ColumnType, Sequence, SequenceKind};

/// Selects which statements [`render_ddl`] produces and how.
#[derive(Debug, Clone)]
pub struct DdlConfig {
    /// Emit `--` comments. The target rejects them, so appliers turn this off.
    pub comments: bool,
    /// Quote identifiers to avoid clashes with reserved words.
    pub protect_ids: bool,
    /// Emit sequences and `CREATE TABLE` statements.
    pub tables: bool,
    /// Emit foreign key statements.
    pub foreign_keys: bool,
    pub dialect: Dialect,
    /// Source driver label, used in comments.
    pub source: String,
}

impl DdlConfig {
    /// Config used when sending DDL to the target: no comments, quoted ids.
    pub fn for_target(dialect: Dialect, source: impl Into<String>) -> Self {
        Self {
            comments: false,
            protect_ids: true,
            tables: true,
            foreign_keys: false,
            dialect,
            source: source.into(),
        }
    }

    pub fn tables(mut self, tables: bool) -> Self {
        self.tables = tables;
        self
    }

    pub fn foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    pub fn comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    fn ident(&self, name: &str) -> String {
        if self.protect_ids {
            self.dialect.quote(name)
        } else {
            name.to_string()
        }
    }

    fn ident_list(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|name| self.ident(name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Render the DDL statements selected by `config`.
pub fn render_ddl(
    config: &DdlConfig,
    tables: &BTreeMap<String, Table>,
    sequences: &BTreeMap<String, Sequence>,
) -> Vec<String> {
    let mut statements = Vec::new();
    let ordered = table_order(tables);

    if config.tables {
        let mut sorted: Vec<&Sequence> = sequences.values().collect();
        sorted.sort_by(|left, right| left.name.cmp(&right.name));
        statements.extend(sorted.into_iter().map(|seq| render_sequence(config, seq)));

        for table in &ordered {
            statements.push(render_table(config, table, tables));
        }
    }

    if config.foreign_keys {
        for table in &ordered {
            for fk in &table.foreign_keys {
                statements.push(render_foreign_key(config, table, fk, tables));
            }
        }
    }

    statements
}

fn render_sequence(config: &DdlConfig, seq: &Sequence) -> String {
    let name = config.ident(&seq.name);
    match config.dialect {
        Dialect::GoogleStandardSql => {
            let mut options = vec![format!("sequence_kind='{}'", sequence_kind(seq.kind))];
            if let Some(min) = seq.skip_range_min {
                options.push(format!("skip_range_min = {min}"));
            }
            if let Some(max) = seq.skip_range_max {
                options.push(format!("skip_range_max = {max}"));
            }
            if let Some(start) = seq.start_with_counter {
                options.push(format!("start_with_counter = {start}"));
            }
            format!("CREATE SEQUENCE {name} OPTIONS ({})", options.join(", "))
        }
        Dialect::Postgresql => {
            let mut statement = format!(
                "CREATE SEQUENCE {name} {}",
                sequence_kind(seq.kind).to_uppercase()
            );
            if let (Some(min), Some(max)) = (seq.skip_range_min, seq.skip_range_max) {
                statement.push_str(&format!(" SKIP RANGE {min} {max}"));
            }
            if let Some(start) = seq.start_with_counter {
                statement.push_str(&format!(" START COUNTER WITH {start}"));
            }
            statement
        }
    }
}

fn sequence_kind(kind: SequenceKind) -> &'static str {
    match kind {
        SequenceKind::BitReversedPositive => "bit_reversed_positive",
    }
}

fn render_table(config: &DdlConfig, table: &Table, tables: &BTreeMap<String, Table>) -> String {
    let mut lines = Vec::new();
    for column in &table.columns {
        if config.comments {
            if let Some(comment) = &column.comment {
                lines.push(format!("\t-- {comment}"));
            }
        }
        lines.push(format!("\t{},", render_column(config, column)));
    }

    let pk = config.ident_list(&table.primary_key);
    let mut statement = String::new();
    if config.comments {
        statement.push_str(&format!(
            "-- Table {} converted from {}\n",
            table.name, config.source
        ));
        if let Some(comment) = &table.comment {
            statement.push_str(&format!("-- {comment}\n"));
        }
    }

    match config.dialect {
        Dialect::GoogleStandardSql => {
            // GoogleSQL accepts a trailing comma after the last column.
            statement.push_str(&format!(
                "CREATE TABLE {} (\n{}\n) PRIMARY KEY ({pk})",
                config.ident(&table.name),
                lines.join("\n")
            ));
        }
        Dialect::Postgresql => {
            lines.push(format!("\tPRIMARY KEY ({pk})"));
            statement.push_str(&format!(
                "CREATE TABLE {} (\n{}\n)",
                config.ident(&table.name),
                lines.join("\n")
            ));
        }
    }

    if let Some(interleave) = &table.interleave {
        let parent = tables
            .get(&interleave.parent)
            .map(|parent| parent.name.as_str())
            .unwrap_or(interleave.parent.as_str());
        match config.dialect {
            Dialect::GoogleStandardSql => statement.push_str(&format!(
                ",\nINTERLEAVE IN PARENT {}{}",
                config.ident(parent),
                on_delete_clause(interleave.on_delete)
            )),
            Dialect::Postgresql => statement.push_str(&format!(
                " INTERLEAVE IN PARENT {}{}",
                config.ident(parent),
                on_delete_clause(interleave.on_delete)
            )),
        }
    }

    statement
}

fn render_column(config: &DdlConfig, column: &Column) -> String {
    let mut rendered = format!(
        "{} {}",
        config.ident(&column.name),
        render_type(config.dialect, &column.column_type)
    );
    if column.not_null {
        rendered.push_str(" NOT NULL");
    }
    rendered
}

fn render_type(dialect: Dialect, column_type: &ColumnType) -> String {
    match dialect {
        Dialect::GoogleStandardSql => {
            let length = column_type
                .length
                .map(|len| len.to_string())
                .unwrap_or_else(|| "MAX".to_string());
            let base = match column_type.base {
                BaseType::Bool => "BOOL".to_string(),
                BaseType::Int64 => "INT64".to_string(),
                BaseType::Float64 => "FLOAT64".to_string(),
                BaseType::Numeric => "NUMERIC".to_string(),
                BaseType::String => format!("STRING({length})"),
                BaseType::Bytes => format!("BYTES({length})"),
                BaseType::Date => "DATE".to_string(),
                BaseType::Timestamp => "TIMESTAMP".to_string(),
                BaseType::Json => "JSON".to_string(),
            };
            if column_type.is_array {
                format!("ARRAY<{base}>")
            } else {
                base
            }
        }
        Dialect::Postgresql => {
            let base = match column_type.base {
                BaseType::Bool => "BOOL".to_string(),
                BaseType::Int64 => "INT8".to_string(),
                BaseType::Float64 => "FLOAT8".to_string(),
                BaseType::Numeric => "NUMERIC".to_string(),
                BaseType::String => match column_type.length {
                    Some(len) => format!("VARCHAR({len})"),
                    None => "VARCHAR".to_string(),
                },
                BaseType::Bytes => "BYTEA".to_string(),
                BaseType::Date => "DATE".to_string(),
                BaseType::Timestamp => "TIMESTAMPTZ".to_string(),
                BaseType::Json => "JSONB".to_string(),
            };
            if column_type.is_array {
                format!("{base}[]")
            } else {
                base
            }
        }
    }
}

fn render_foreign_key(
    config: &DdlConfig,
    table: &Table,
    fk: &ForeignKey,
    tables: &BTreeMap<String, Table>,
) -> String {
    let referenced = tables
        .get(&fk.referenced_table)
        .map(|referenced| referenced.name.as_str())
        .unwrap_or(fk.referenced_table.as_str());
    let constraint = fk
        .name
        .as_ref()
        .map(|name| format!("CONSTRAINT {} ", config.ident(name)))
        .unwrap_or_default();

    format!(
        "ALTER TABLE {} ADD {constraint}FOREIGN KEY ({}) REFERENCES {} ({}){}",
        config.ident(&table.name),
        config.ident_list(&fk.columns),
        config.ident(referenced),
        config.ident_list(&fk.referenced_columns),
        on_delete_clause(fk.on_delete)
    )
}

fn on_delete_clause(action: FkAction) -> &'static str {
    match action {
        FkAction::NoAction => "",
        FkAction::Cascade => " ON DELETE CASCADE",
    }
}
