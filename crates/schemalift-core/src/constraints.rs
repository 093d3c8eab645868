use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Referential action applied when a referenced row is deleted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FkAction {
    #[default]
    NoAction,
    Cascade,
}

/// Foreign key definition preserving column ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
    /// Id of the referenced table within the same schema model.
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: FkAction,
}

/// Physical co-location of a child table inside its parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Interleave {
    /// Id of the parent table.
    pub parent: String,
    #[serde(default)]
    pub on_delete: FkAction,
}
