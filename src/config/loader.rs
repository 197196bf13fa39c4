//! Load resource config from the embedded catalog (or any JSON source) and resolve it.

use crate::config::resolved::{ColumnInfo, ForeignKey, ResolvedResource, ResourceRegistry};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::collections::HashMap;

const BUILTIN_CATALOG: &str = include_str!("catalog.json");

/// Products, categories and users as shipped with the service.
pub fn builtin_catalog() -> Result<Vec<ResourceConfig>, ConfigError> {
    parse_catalog(BUILTIN_CATALOG)
}

pub fn parse_catalog(json: &str) -> Result<Vec<ResourceConfig>, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Build the registry from config (validates first). Tables are qualified with `schema_name`.
pub fn resolve(configs: &[ResourceConfig], schema_name: &str) -> Result<ResourceRegistry, ConfigError> {
    validate(configs)?;

    let targets: HashMap<&str, ForeignKey> = configs
        .iter()
        .map(|r| {
            (
                r.path_segment.as_str(),
                ForeignKey {
                    table: crate::sql::qualified_table(schema_name, &r.table),
                    column: r.primary_key.clone(),
                },
            )
        })
        .collect();

    let mut resources = Vec::with_capacity(configs.len());
    let mut resource_by_path = HashMap::new();

    for r in configs {
        let columns = r
            .columns
            .iter()
            .map(|c| ColumnInfo {
                name: c.name.clone(),
                kind: c.kind,
                is_pk: c.name == r.primary_key,
                nullable: c.nullable,
                unique: c.unique,
                default: c.default.clone(),
                references: c
                    .references
                    .as_deref()
                    .and_then(|target| targets.get(target).cloned()),
            })
            .collect();

        let resource = ResolvedResource {
            name: r.name.clone(),
            plural: r.plural.clone(),
            schema_name: schema_name.to_string(),
            table_name: r.table.clone(),
            path_segment: r.path_segment.clone(),
            pk_column: r.primary_key.clone(),
            columns,
            delete: r.delete.clone(),
            operations: r.operations.iter().copied().collect(),
            protected: r.protected.iter().copied().collect(),
            create_rules: r.create.clone(),
            replace_rules: r.replace.clone(),
            required_message: r.required_message.clone(),
            sensitive_columns: r.sensitive_columns.iter().cloned().collect(),
            hashed_columns: r.hashed_columns.iter().cloned().collect(),
            credentials: r.credentials.clone(),
        };
        resource_by_path.insert(r.path_segment.clone(), resources.len());
        resources.push(resource);
    }

    Ok(ResourceRegistry {
        resources,
        resource_by_path,
    })
}
