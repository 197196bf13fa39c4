//! Request validation from per-resource field rules.

use crate::config::{FieldRule, ResolvedResource};
use crate::error::AppError;
use crate::service::Entity;
use crate::sql::PgBindValue;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Check `body` against `rules` and build the entity from ruled fields only.
    /// Fields without a rule are dropped. A missing required field yields the
    /// resource's `required_message`; a value of the wrong kind names the field.
    pub fn validate(
        resource: &ResolvedResource,
        rules: &[FieldRule],
        body: &Map<String, Value>,
    ) -> Result<Entity, AppError> {
        let mut entity = Entity::new();
        for rule in rules {
            let Some(col) = resource.column(&rule.column) else {
                continue;
            };
            let val = match body.get(&rule.column) {
                None | Some(Value::Null) => {
                    if rule.required {
                        return Err(AppError::Validation(resource.required_message.clone()));
                    }
                    rule.default.clone().unwrap_or(Value::Null)
                }
                Some(v) => v.clone(),
            };
            if rule.non_empty && val.as_str().map(|s| s.trim().is_empty()).unwrap_or(false) {
                return Err(AppError::Validation(resource.required_message.clone()));
            }
            let bind = PgBindValue::from_json(col.kind, &val).ok_or_else(|| {
                AppError::Validation(format!("{} must be {}", rule.column, col.kind.describe()))
            })?;
            entity.set(rule.column.clone(), bind);
        }
        Ok(entity)
    }
}
