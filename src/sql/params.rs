//! Typed statement parameters, converted from JSON according to the target column kind.

use crate::config::ColumnKind;
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A value that can be bound to a PostgreSQL statement. NULLs stay typed so the server
/// sees the column's own parameter type.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Text(Option<String>),
    Int(Option<i64>),
    Numeric(Option<f64>),
    Bool(Option<bool>),
}

impl PgBindValue {
    /// Convert a JSON value for a column of `kind`. Returns None when the value has the wrong type.
    pub fn from_json(kind: ColumnKind, v: &Value) -> Option<Self> {
        Some(match (kind, v) {
            (ColumnKind::Text, Value::Null) => PgBindValue::Text(None),
            (ColumnKind::Integer, Value::Null) => PgBindValue::Int(None),
            (ColumnKind::Numeric, Value::Null) => PgBindValue::Numeric(None),
            (ColumnKind::Boolean, Value::Null) => PgBindValue::Bool(None),
            (ColumnKind::Text, Value::String(s)) => PgBindValue::Text(Some(s.clone())),
            (ColumnKind::Integer, Value::Number(n)) => PgBindValue::Int(Some(n.as_i64()?)),
            (ColumnKind::Numeric, Value::Number(n)) => PgBindValue::Numeric(Some(n.as_f64()?)),
            (ColumnKind::Boolean, Value::Bool(b)) => PgBindValue::Bool(Some(*b)),
            _ => return None,
        })
    }

    pub fn to_json(&self) -> Value {
        match self {
            PgBindValue::Text(v) => v.clone().map(Value::String).unwrap_or(Value::Null),
            PgBindValue::Int(v) => v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null),
            PgBindValue::Numeric(v) => v
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PgBindValue::Bool(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            PgBindValue::Text(v) => <Option<String> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::Int(v) => <Option<i64> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::Numeric(v) => <Option<f64> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::Bool(v) => <Option<bool> as Encode<Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Text(_) => <String as Type<Postgres>>::type_info(),
            PgBindValue::Int(_) => <i64 as Type<Postgres>>::type_info(),
            PgBindValue::Numeric(_) => <f64 as Type<Postgres>>::type_info(),
            PgBindValue::Bool(_) => <bool as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}
