//! Raw resource configuration, deserialized from the embedded catalog (see `catalog.json`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage kind of a column. Drives DDL type, parameter binding and payload type checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Numeric,
    Boolean,
}

impl ColumnKind {
    /// Column type used in CREATE TABLE.
    pub fn ddl_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "BIGINT",
            ColumnKind::Numeric => "NUMERIC(10, 2)",
            ColumnKind::Boolean => "BOOLEAN",
        }
    }

    /// Phrase used in validation messages ("price must be a number").
    pub fn describe(&self) -> &'static str {
        match self {
            ColumnKind::Text => "a string",
            ColumnKind::Integer => "an integer",
            ColumnKind::Numeric => "a number",
            ColumnKind::Boolean => "a boolean",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    pub kind: ColumnKind,
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// SQL literal used as column DEFAULT (e.g. "false").
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub unique: bool,
    /// Path segment of the resource whose primary key this column references.
    #[serde(default)]
    pub references: Option<String>,
}

fn default_true() -> bool {
    true
}

/// How `delete_by_id` treats a row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Row removed permanently.
    Hard,
    /// Row kept; `flag_column` set to true and the row hidden from reads.
    Soft { flag_column: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Create,
    Read,
    Replace,
    Delete,
    DeleteAll,
    Login,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::List,
        Operation::Create,
        Operation::Read,
        Operation::Replace,
        Operation::Delete,
        Operation::DeleteAll,
        Operation::Login,
    ];
}

/// One accepted payload field. Fields without a rule are dropped from the payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FieldRule {
    pub column: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub non_empty: bool,
    /// Value used when the field is absent or null. Absent and no default means NULL.
    #[serde(default)]
    pub default: Option<Value>,
}

/// Columns used by the login operation to match a stored record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialConfig {
    pub identity: String,
    pub secret: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Singular name used in messages ("product").
    pub name: String,
    /// Plural name used in messages ("products").
    pub plural: String,
    pub table: String,
    pub path_segment: String,
    pub primary_key: String,
    pub columns: Vec<ColumnConfig>,
    pub delete: DeletePolicy,
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub protected: Vec<Operation>,
    /// Payload rules for create (also used for login).
    #[serde(default)]
    pub create: Vec<FieldRule>,
    /// Payload rules for full-replace update.
    #[serde(default)]
    pub replace: Vec<FieldRule>,
    /// Message returned when a required field is missing or empty.
    pub required_message: String,
    /// Columns never returned in responses.
    #[serde(default)]
    pub sensitive_columns: Vec<String>,
    /// Columns stored as a bcrypt hash of the submitted value.
    #[serde(default)]
    pub hashed_columns: Vec<String>,
    #[serde(default)]
    pub credentials: Option<CredentialConfig>,
}
