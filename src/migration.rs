//! Bootstrap resource tables: CREATE SCHEMA and CREATE TABLE IF NOT EXISTS, referenced tables first.

use crate::config::{ResolvedResource, ResourceRegistry};
use crate::error::ConfigError;
use crate::sql::{qualified_table, quoted};
use crate::store::check_identifier;
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

/// DDL for one resource table. Idempotent.
pub fn create_table_sql(r: &ResolvedResource) -> String {
    let mut col_defs = Vec::with_capacity(r.columns.len());
    for c in &r.columns {
        if c.is_pk {
            col_defs.push(format!("{} BIGSERIAL PRIMARY KEY", quoted(&c.name)));
            continue;
        }
        let mut def = format!("{} {}", quoted(&c.name), c.kind.ddl_type());
        if !c.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(ref d) = c.default {
            def.push_str(" DEFAULT ");
            def.push_str(d);
        }
        if c.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(ref fk) = c.references {
            def.push_str(&format!(" REFERENCES {} ({})", fk.table, quoted(&fk.column)));
        }
        col_defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        qualified_table(&r.schema_name, &r.table_name),
        col_defs.join(",\n    ")
    )
}

/// Resources ordered so every referenced table is created before the tables pointing at it.
fn creation_order(registry: &ResourceRegistry) -> Result<Vec<&ResolvedResource>, ConfigError> {
    let mut pending: Vec<&ResolvedResource> = registry.iter().collect();
    let mut done: Vec<String> = Vec::new();
    let mut out = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|r| {
            let own = qualified_table(&r.schema_name, &r.table_name);
            let ready = r
                .columns
                .iter()
                .filter_map(|c| c.references.as_ref())
                .all(|fk| fk.table == own || done.contains(&fk.table));
            if ready {
                done.push(own);
                out.push(*r);
            }
            !ready
        });
        if pending.len() == before {
            return Err(ConfigError::Validation(format!(
                "circular table references among: {}",
                pending.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", ")
            )));
        }
    }
    Ok(out)
}

/// Create the schema and every resource table that does not exist yet.
pub async fn apply_migrations(pool: &PgPool, registry: &ResourceRegistry) -> Result<(), MigrationError> {
    let order = creation_order(registry)?;
    let mut schemas: Vec<&str> = Vec::new();
    for r in &order {
        if !schemas.contains(&r.schema_name.as_str()) {
            check_identifier(&r.schema_name)?;
            sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(&r.schema_name)))
                .execute(pool)
                .await?;
            schemas.push(r.schema_name.as_str());
        }
        sqlx::query(&create_table_sql(r)).execute(pool).await?;
        tracing::debug!(table = %r.table_name, schema = %r.schema_name, "table ready");
    }
    tracing::info!(tables = order.len(), "resource tables ready");
    Ok(())
}
