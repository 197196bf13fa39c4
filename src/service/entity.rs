//! Validated payload for a write: only configured columns, already typed.

use crate::sql::PgBindValue;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    fields: Vec<(String, PgBindValue)>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: PgBindValue) {
        let column = column.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&PgBindValue> {
        self.fields.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        match self.get(column) {
            Some(PgBindValue::Text(Some(s))) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn fields(&self) -> &[(String, PgBindValue)] {
        &self.fields
    }

    /// JSON object of the fields, with `pk` = `id` merged in front.
    pub fn to_json_with_id(&self, pk: &str, id: i64) -> Value {
        let mut map = Map::new();
        map.insert(pk.to_string(), Value::Number(id.into()));
        for (c, v) in &self.fields {
            map.insert(c.clone(), v.to_json());
        }
        Value::Object(map)
    }
}
