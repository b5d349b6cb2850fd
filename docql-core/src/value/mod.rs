//! Resolved values and the value resolver.
//!
//! [`resolve`] turns an AST [`Value`] into a [`FieldValue`] by binding
//! parameters and applying `convert(...)`. It is pure, so one AST can be
//! resolved any number of times against different parameter maps.

mod convert;

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::ast::Value;
use crate::error::{DocqlError, DocqlResult};

pub use convert::ConversionTarget;

/// Parameter values for `@name` references
pub type Params = HashMap<String, FieldValue>;

/// A fully resolved value, ready to be handed to a store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Timestamp(DateTime<FixedOffset>),
    Array(Vec<FieldValue>),
    /// Nested field map, source order
    Document(Vec<(String, FieldValue)>),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Date(_) => "date",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::Time(_) => "time",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Array(_) => "array",
            FieldValue::Document(_) => "document",
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// JSON form: temporal values become ISO-8601 strings, documents objects.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Build a value from JSON, e.g. a parameter given on the command line.
    ///
    /// Integral numbers become integers; `null` has no counterpart.
    pub fn from_json(value: &serde_json::Value) -> DocqlResult<FieldValue> {
        match value {
            serde_json::Value::Null => Err(DocqlError::ConversionError {
                value: "null".to_string(),
                target: "value".to_string(),
            }),
            serde_json::Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
            serde_json::Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_json::Value::String(s) => Ok(FieldValue::String(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(FieldValue::from_json)
                .collect::<DocqlResult<Vec<_>>>()
                .map(FieldValue::Array),
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), FieldValue::from_json(v)?)))
                .collect::<DocqlResult<Vec<_>>>()
                .map(FieldValue::Document),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Integer(n) => serializer.serialize_i64(*n),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            FieldValue::DateTime(dt) => serializer.collect_str(&dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            FieldValue::Time(t) => serializer.collect_str(&t.format("%H:%M:%S%.f")),
            FieldValue::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            FieldValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Document(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

macro_rules! field_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::$variant(value.into())
                }
            }
        )*
    };
}

field_value_from! {
    i8 => Integer,
    i16 => Integer,
    i32 => Integer,
    i64 => Integer,
    u8 => Integer,
    u16 => Integer,
    u32 => Integer,
    f32 => Float,
    f64 => Float,
    bool => Boolean,
    String => String,
    &str => String,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    NaiveTime => Time,
    DateTime<FixedOffset> => Timestamp,
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Resolve an AST value against a parameter map.
///
/// Fails with `UnboundParameter` for a missing `@name`, with
/// `UnsupportedConversion` for an unknown `convert` type and with
/// `ConversionError` when the value cannot take the requested type.
pub fn resolve(value: &Value, params: &Params) -> DocqlResult<FieldValue> {
    match value {
        Value::Integer(n) => Ok(FieldValue::Integer(*n)),
        Value::Float(f) => Ok(FieldValue::Float(*f)),
        Value::String(s) => Ok(FieldValue::String(s.clone())),
        Value::Boolean(b) => Ok(FieldValue::Boolean(*b)),
        Value::Array(items) => items
            .iter()
            .map(|item| resolve(item, params))
            .collect::<DocqlResult<Vec<_>>>()
            .map(FieldValue::Array),
        Value::Object(fields) => fields
            .iter()
            .map(|(name, item)| Ok((name.clone(), resolve(item, params)?)))
            .collect::<DocqlResult<Vec<_>>>()
            .map(FieldValue::Document),
        Value::Parameter(name) => params
            .get(name)
            .cloned()
            .ok_or_else(|| DocqlError::UnboundParameter(name.clone())),
        Value::Convert { value, type_name } => {
            let target = ConversionTarget::from_type_name(type_name)
                .ok_or_else(|| DocqlError::UnsupportedConversion(type_name.clone()))?;
            target.convert(resolve(value, params)?)
        }
    }
}
