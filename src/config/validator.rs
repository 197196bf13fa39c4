//! Config validation: referential integrity and API consistency.

use crate::config::{ColumnKind, DeletePolicy, Operation, ResourceConfig};
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate(configs: &[ResourceConfig]) -> Result<(), ConfigError> {
    let mut path_segments = HashSet::new();
    for r in configs {
        if !path_segments.insert(r.path_segment.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(r.path_segment.clone()));
        }
    }

    for r in configs {
        let columns: HashSet<&str> = r.columns.iter().map(|c| c.name.as_str()).collect();

        let pk = r
            .columns
            .iter()
            .find(|c| c.name == r.primary_key)
            .ok_or_else(|| ConfigError::InvalidPrimaryKey {
                resource: r.name.clone(),
                column: r.primary_key.clone(),
            })?;
        if pk.kind != ColumnKind::Integer {
            return Err(ConfigError::InvalidPrimaryKey {
                resource: r.name.clone(),
                column: r.primary_key.clone(),
            });
        }

        if let DeletePolicy::Soft { flag_column } = &r.delete {
            let flag = r.columns.iter().find(|c| &c.name == flag_column);
            if !matches!(flag, Some(c) if c.kind == ColumnKind::Boolean) {
                return Err(ConfigError::Validation(format!(
                    "{}: soft delete flag '{}' must be a boolean column",
                    r.name, flag_column
                )));
            }
        }

        for c in &r.columns {
            if let Some(target) = &c.references {
                if !path_segments.contains(target.as_str()) {
                    return Err(ConfigError::MissingReference {
                        kind: "resource",
                        id: target.clone(),
                    });
                }
            }
        }

        for rule in r.create.iter().chain(r.replace.iter()) {
            if !columns.contains(rule.column.as_str()) {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", r.name, rule.column),
                });
            }
            if rule.column == r.primary_key {
                return Err(ConfigError::Validation(format!(
                    "{}: primary key '{}' cannot be written by payloads",
                    r.name, rule.column
                )));
            }
        }

        for col in r.sensitive_columns.iter().chain(r.hashed_columns.iter()) {
            if !columns.contains(col.as_str()) {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", r.name, col),
                });
            }
        }

        for op in &r.protected {
            if !r.operations.contains(op) {
                return Err(ConfigError::Validation(format!(
                    "{}: protected operation {:?} is not enabled",
                    r.name, op
                )));
            }
        }

        if r.operations.contains(&Operation::Login) {
            let creds = r.credentials.as_ref().ok_or_else(|| {
                ConfigError::Validation(format!("{}: login requires credentials", r.name))
            })?;
            for col in [&creds.identity, &creds.secret] {
                if !columns.contains(col.as_str()) {
                    return Err(ConfigError::MissingReference {
                        kind: "column",
                        id: format!("{}.{}", r.name, col),
                    });
                }
            }
        }
    }

    Ok(())
}
