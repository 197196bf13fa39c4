//! Resolved resource model: config validated and flattened for runtime use.

use crate::config::{ColumnKind, CredentialConfig, DeletePolicy, FieldRule, Operation};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Foreign key target, already schema-qualified.
#[derive(Clone, Debug)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub is_pk: bool,
    pub nullable: bool,
    pub unique: bool,
    /// SQL literal DEFAULT, if any.
    pub default: Option<String>,
    pub references: Option<ForeignKey>,
}

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub name: String,
    pub plural: String,
    pub schema_name: String,
    pub table_name: String,
    pub path_segment: String,
    pub pk_column: String,
    pub columns: Vec<ColumnInfo>,
    pub delete: DeletePolicy,
    pub operations: HashSet<Operation>,
    pub protected: HashSet<Operation>,
    pub create_rules: Vec<FieldRule>,
    pub replace_rules: Vec<FieldRule>,
    pub required_message: String,
    pub sensitive_columns: HashSet<String>,
    pub hashed_columns: HashSet<String>,
    pub credentials: Option<CredentialConfig>,
}

impl ResolvedResource {
    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    pub fn is_protected(&self, op: Operation) -> bool {
        self.protected.contains(&op)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Soft-delete flag column; rows with the flag set are excluded from reads.
    pub fn active_filter(&self) -> Option<&str> {
        match &self.delete {
            DeletePolicy::Soft { flag_column } => Some(flag_column.as_str()),
            DeletePolicy::Hard => None,
        }
    }

    /// Singular name with a capital first letter ("Product").
    pub fn title(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn not_found_message(&self, id: i64) -> String {
        format!("Not found {} with id {}.", self.name, id)
    }

    pub fn deleted_message(&self) -> String {
        format!("{} was deleted successfully!", self.title())
    }

    pub fn deleted_all_message(&self) -> String {
        format!("All {} were deleted successfully!", self.plural)
    }

    /// Message used for an infrastructure failure when the store gave no message of its own.
    pub fn fallback_message(&self, op: Operation, id: Option<i64>) -> String {
        let id = id.map(|n| n.to_string()).unwrap_or_default();
        match op {
            Operation::List => format!("Some error occurred while retrieving {}.", self.plural),
            Operation::Create => format!("Some error occurred while creating the {}.", self.name),
            Operation::Read => format!("Error retrieving {} with id {}", self.name, id),
            Operation::Replace => format!("Error updating {} with id {}", self.name, id),
            Operation::Delete => format!("Could not delete {} with id {}", self.name, id),
            Operation::DeleteAll => format!("Some error occurred while removing all {}.", self.plural),
            Operation::Login => "Some error occurred.".to_string(),
        }
    }

    /// Strip sensitive columns from a row before it leaves the service.
    pub fn redact(&self, mut row: Value) -> Value {
        if let Value::Object(map) = &mut row {
            for col in &self.sensitive_columns {
                map.remove(col);
            }
        }
        row
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    pub resources: Vec<ResolvedResource>,
    pub resource_by_path: HashMap<String, usize>,
}

impl ResourceRegistry {
    pub fn resource_by_path(&self, path: &str) -> Option<&ResolvedResource> {
        self.resource_by_path.get(path).map(|&i| &self.resources[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedResource> {
        self.resources.iter()
    }
}
