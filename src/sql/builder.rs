//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a resolved resource.

use crate::config::{ColumnInfo, ColumnKind, DeletePolicy, ResolvedResource};
use crate::service::Entity;
use crate::sql::PgBindValue;

/// Quote identifier for PostgreSQL (safe: only from config).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Clone, Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        Self::default()
    }

    fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn table(r: &ResolvedResource) -> String {
    qualified_table(&r.schema_name, &r.table_name)
}

/// SELECT list: numeric columns come back as float8 so rows decode to JSON numbers.
fn select_column_list(r: &ResolvedResource) -> String {
    r.columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            match c.kind {
                ColumnKind::Numeric => format!("{}::float8 AS {}", q, q),
                _ => q,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholder(col: Option<&ColumnInfo>, n: usize) -> String {
    match col.map(|c| c.kind) {
        Some(ColumnKind::Numeric) => format!("${}::numeric", n),
        _ => format!("${}", n),
    }
}

/// ` AND "flag" = false` / ` WHERE "flag" = false` for soft-deleted resources.
fn active_clause(r: &ResolvedResource, joiner: &str) -> String {
    r.active_filter()
        .map(|flag| format!(" {} {} = false", joiner, quoted(flag)))
        .unwrap_or_default()
}

/// All active rows ordered by primary key.
pub fn select_list(r: &ResolvedResource) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}",
        select_column_list(r),
        table(r),
        active_clause(r, "WHERE"),
        quoted(&r.pk_column)
    );
    q
}

/// One active row by primary key.
pub fn select_by_id(r: &ResolvedResource, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::Int(Some(id)));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}{}",
        select_column_list(r),
        table(r),
        quoted(&r.pk_column),
        n,
        active_clause(r, "AND")
    );
    q
}

/// First active row whose `column` equals `value`.
pub fn select_by_column(r: &ResolvedResource, column: &str, value: PgBindValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(value);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}{} ORDER BY {} LIMIT 1",
        select_column_list(r),
        table(r),
        quoted(column),
        placeholder(r.column(column), n),
        active_clause(r, "AND"),
        quoted(&r.pk_column)
    );
    q
}

/// INSERT of the entity's fields; columns not in the entity take their DB default. Returns the stored row.
pub fn insert(r: &ResolvedResource, entity: &Entity) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (name, value) in entity.fields() {
        let col = r.column(name);
        if col.map(|c| c.is_pk).unwrap_or(true) {
            continue;
        }
        let n = q.push_param(value.clone());
        cols.push(quoted(name));
        placeholders.push(placeholder(col, n));
    }
    let returning = select_column_list(r);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table(r), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table(r),
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id setting every entity field. No RETURNING: callers read the affected-row count.
pub fn update(r: &ResolvedResource, id: i64, entity: &Entity) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = quoted(&r.pk_column);
    let mut sets = Vec::new();
    for (name, value) in entity.fields() {
        let col = r.column(name);
        if col.map(|c| c.is_pk).unwrap_or(true) {
            continue;
        }
        let n = q.push_param(value.clone());
        sets.push(format!("{} = {}", quoted(name), placeholder(col, n)));
    }
    if sets.is_empty() {
        sets.push(format!("{} = {}", pk, pk));
    }
    let id_param = q.push_param(PgBindValue::Int(Some(id)));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        table(r),
        sets.join(", "),
        pk,
        id_param
    );
    q
}

/// DELETE (hard) or flag update (soft) by id, following the resource's delete policy.
pub fn delete_by_id(r: &ResolvedResource, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::Int(Some(id)));
    let pk = quoted(&r.pk_column);
    q.sql = match &r.delete {
        DeletePolicy::Hard => format!("DELETE FROM {} WHERE {} = ${}", table(r), pk, n),
        DeletePolicy::Soft { flag_column } => format!(
            "UPDATE {} SET {} = true WHERE {} = ${}",
            table(r),
            quoted(flag_column),
            pk,
            n
        ),
    };
    q
}

/// Unconditional hard delete of every row.
pub fn delete_all(r: &ResolvedResource) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("DELETE FROM {}", table(r));
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin_catalog, resolve, ResourceRegistry};

    fn registry() -> ResourceRegistry {
        resolve(&builtin_catalog().unwrap(), "shop").unwrap()
    }

    #[test]
    fn list_filters_soft_deleted_rows() {
        let reg = registry();
        let q = select_list(reg.resource_by_path("categories").unwrap());
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"cat_name\", \"is_deleted\" FROM \"shop\".\"category\" WHERE \"is_deleted\" = false ORDER BY \"id\""
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn list_of_hard_deleted_resource_is_unfiltered() {
        let reg = registry();
        let q = select_list(reg.resource_by_path("products").unwrap());
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"price\"::float8 AS \"price\", \"cat_id\", \"image\" FROM \"shop\".\"products\" ORDER BY \"id\""
        );
    }

    #[test]
    fn select_by_id_binds_id() {
        let reg = registry();
        let q = select_by_id(reg.resource_by_path("categories").unwrap(), 9);
        assert!(q.sql.ends_with("WHERE \"id\" = $1 AND \"is_deleted\" = false"));
        assert_eq!(q.params, vec![PgBindValue::Int(Some(9))]);
    }

    #[test]
    fn insert_uses_entity_fields_and_casts_numeric() {
        let reg = registry();
        let mut e = Entity::new();
        e.set("name", PgBindValue::Text(Some("Pen".into())));
        e.set("price", PgBindValue::Numeric(Some(1.5)));
        e.set("cat_id", PgBindValue::Int(Some(2)));
        e.set("image", PgBindValue::Text(None));
        let q = insert(reg.resource_by_path("products").unwrap(), &e);
        assert_eq!(
            q.sql,
            "INSERT INTO \"shop\".\"products\" (\"name\", \"price\", \"cat_id\", \"image\") VALUES ($1, $2::numeric, $3, $4) RETURNING \"id\", \"name\", \"price\"::float8 AS \"price\", \"cat_id\", \"image\""
        );
        assert_eq!(q.params.len(), 4);
    }

    #[test]
    fn insert_never_writes_primary_key() {
        let reg = registry();
        let mut e = Entity::new();
        e.set("id", PgBindValue::Int(Some(100)));
        e.set("cat_name", PgBindValue::Text(Some("Books".into())));
        let q = insert(reg.resource_by_path("categories").unwrap(), &e);
        assert!(q.sql.starts_with("INSERT INTO \"shop\".\"category\" (\"cat_name\") VALUES ($1)"));
        assert_eq!(q.params, vec![PgBindValue::Text(Some("Books".into()))]);
    }

    #[test]
    fn update_binds_id_last() {
        let reg = registry();
        let mut e = Entity::new();
        e.set("cat_name", PgBindValue::Text(Some("Toys".into())));
        e.set("is_deleted", PgBindValue::Bool(Some(false)));
        let q = update(reg.resource_by_path("categories").unwrap(), 5, &e);
        assert_eq!(
            q.sql,
            "UPDATE \"shop\".\"category\" SET \"cat_name\" = $1, \"is_deleted\" = $2 WHERE \"id\" = $3"
        );
        assert_eq!(q.params[2], PgBindValue::Int(Some(5)));
    }

    #[test]
    fn delete_follows_policy() {
        let reg = registry();
        let soft = delete_by_id(reg.resource_by_path("categories").unwrap(), 3);
        assert_eq!(soft.sql, "UPDATE \"shop\".\"category\" SET \"is_deleted\" = true WHERE \"id\" = $1");
        let hard = delete_by_id(reg.resource_by_path("products").unwrap(), 3);
        assert_eq!(hard.sql, "DELETE FROM \"shop\".\"products\" WHERE \"id\" = $1");
        assert_eq!(delete_all(reg.resource_by_path("products").unwrap()).sql, "DELETE FROM \"shop\".\"products\"");
    }

    #[test]
    fn lookup_by_column_limits_to_one_row() {
        let reg = registry();
        let q = select_by_column(
            reg.resource_by_path("users").unwrap(),
            "email",
            PgBindValue::Text(Some("a@b.c".into())),
        );
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"email\", \"password\" FROM \"shop\".\"users\" WHERE \"email\" = $1 ORDER BY \"id\" LIMIT 1"
        );
    }
}
