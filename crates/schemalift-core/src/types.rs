use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Scalar type of a column in the target database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    Bool,
    Int64,
    Float64,
    Numeric,
    String,
    Bytes,
    Date,
    Timestamp,
    Json,
}

/// Column type with optional length and array flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ColumnType {
    pub base: BaseType,
    /// Maximum length for `string`/`bytes`; `None` means unbounded.
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub is_array: bool,
}

impl ColumnType {
    /// Scalar, non-array type without a length.
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            length: None,
            is_array: false,
        }
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }
}

/// Kind of sequence supported by the target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    BitReversedPositive,
}

/// Sequence definition created alongside tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Sequence {
    pub name: String,
    pub kind: SequenceKind,
    #[serde(default)]
    pub skip_range_min: Option<i64>,
    #[serde(default)]
    pub skip_range_max: Option<i64>,
    #[serde(default)]
    pub start_with_counter: Option<i64>,
}
