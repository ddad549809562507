// [libs/infra/catalog-store/src/sql_value.rs]
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, Postgres};

/// A dynamically-typed bind parameter. The store's `exec`/`fetch_*` surface
/// (spec §4.1) takes `(stmt, args)` pairs the way the teacher's libsql
/// facade does with `impl IntoParams`; sqlx has no equivalent dynamic-arity
/// binding, so this enum plays that role for Postgres.
#[derive(Debug, Clone)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
    Null,
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}
impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}
impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}
impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}
impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}
impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}
impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}
impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Builds a Postgres argument list from a slice of `SqlValue`s, preserving
/// order — callers write `$1, $2, …` placeholders the usual sqlx way.
pub fn bind_arguments(values: &[SqlValue]) -> PgArguments {
    let mut args = PgArguments::default();
    for value in values {
        match value {
            SqlValue::Text(s) => { let _ = args.add(s.clone()); }
            SqlValue::Int(i) => { let _ = args.add(*i); }
            SqlValue::Float(f) => { let _ = args.add(*f); }
            SqlValue::Bool(b) => { let _ = args.add(*b); }
            SqlValue::Timestamp(t) => { let _ = args.add(*t); }
            SqlValue::Json(j) => { let _ = args.add(sqlx::types::Json(j.clone())); }
            SqlValue::Null => { let _ = args.add(Option::<String>::None); }
        }
    }
    args
}

pub type PgBoundQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;
