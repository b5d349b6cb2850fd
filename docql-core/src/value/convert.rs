//! `convert(value, type)` targets.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::FieldValue;
use crate::error::{DocqlError, DocqlResult};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionTarget {
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    String,
    Boolean,
    Date,
    DateTime,
    Time,
    Timestamp,
}

impl ConversionTarget {
    /// Look up a target by type name. Only the last dot-separated segment is
    /// significant and matching ignores case, so `java.lang.Integer`,
    /// `Integer` and `int` all name the same target.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let simple = type_name.rsplit('.').next().unwrap_or(type_name);

        let target = match simple.to_lowercase().as_str() {
            "byte" | "i8" => ConversionTarget::Int8,
            "short" | "i16" => ConversionTarget::Int16,
            "int" | "integer" | "i32" => ConversionTarget::Int32,
            "long" | "i64" | "biginteger" => ConversionTarget::Int64,
            "double" | "f64" | "float" | "f32" | "bigdecimal" | "number" => {
                ConversionTarget::Float
            }
            "string" | "str" => ConversionTarget::String,
            "boolean" | "bool" => ConversionTarget::Boolean,
            "date" | "localdate" => ConversionTarget::Date,
            "datetime" | "localdatetime" => ConversionTarget::DateTime,
            "time" | "localtime" => ConversionTarget::Time,
            "timestamp" | "instant" | "offsetdatetime" | "zoneddatetime" => {
                ConversionTarget::Timestamp
            }
            _ => return None,
        };

        Some(target)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConversionTarget::Int8 => "byte",
            ConversionTarget::Int16 => "short",
            ConversionTarget::Int32 => "int",
            ConversionTarget::Int64 => "long",
            ConversionTarget::Float => "double",
            ConversionTarget::String => "string",
            ConversionTarget::Boolean => "boolean",
            ConversionTarget::Date => "date",
            ConversionTarget::DateTime => "datetime",
            ConversionTarget::Time => "time",
            ConversionTarget::Timestamp => "timestamp",
        }
    }

    pub fn convert(&self, value: FieldValue) -> DocqlResult<FieldValue> {
        let converted = match self {
            ConversionTarget::Int8 => to_integer(&value, i8::MIN as i64, i8::MAX as i64),
            ConversionTarget::Int16 => to_integer(&value, i16::MIN as i64, i16::MAX as i64),
            ConversionTarget::Int32 => to_integer(&value, i32::MIN as i64, i32::MAX as i64),
            ConversionTarget::Int64 => to_integer(&value, i64::MIN, i64::MAX),
            ConversionTarget::Float => to_float(&value),
            ConversionTarget::String => to_string(&value),
            ConversionTarget::Boolean => to_boolean(&value),
            ConversionTarget::Date => to_date(&value),
            ConversionTarget::DateTime => to_datetime(&value),
            ConversionTarget::Time => to_time(&value),
            ConversionTarget::Timestamp => to_timestamp(&value),
        };

        converted.ok_or_else(|| DocqlError::ConversionError {
            value: value.to_string(),
            target: self.name().to_string(),
        })
    }
}

fn to_integer(value: &FieldValue, min: i64, max: i64) -> Option<FieldValue> {
    let n = match value {
        FieldValue::Integer(n) => *n,
        // `as` saturates, so out-of-range floats are rejected before the cast
        FieldValue::Float(f) if f.fract() == 0.0 => {
            (*f >= i64::MIN as f64 && *f < i64::MAX as f64).then_some(*f as i64)?
        }
        FieldValue::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    (min..=max).contains(&n).then_some(FieldValue::Integer(n))
}

fn to_float(value: &FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::Integer(n) => Some(FieldValue::Float(*n as f64)),
        FieldValue::Float(f) => Some(FieldValue::Float(*f)),
        FieldValue::String(s) => s.trim().parse::<f64>().ok().map(FieldValue::Float),
        _ => None,
    }
}

fn to_string(value: &FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::String(s) => Some(FieldValue::String(s.clone())),
        FieldValue::Array(_) | FieldValue::Document(_) => None,
        // scalars and temporals use their JSON text, minus quotes
        other => match other.to_json() {
            serde_json::Value::String(s) => Some(FieldValue::String(s)),
            json => Some(FieldValue::String(json.to_string())),
        },
    }
}

fn to_boolean(value: &FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::Boolean(b) => Some(FieldValue::Boolean(*b)),
        FieldValue::Integer(0) => Some(FieldValue::Boolean(false)),
        FieldValue::Integer(1) => Some(FieldValue::Boolean(true)),
        FieldValue::String(s) if s.eq_ignore_ascii_case("true") => Some(FieldValue::Boolean(true)),
        FieldValue::String(s) if s.eq_ignore_ascii_case("false") => {
            Some(FieldValue::Boolean(false))
        }
        _ => None,
    }
}

fn to_date(value: &FieldValue) -> Option<FieldValue> {
    let date = match value {
        FieldValue::Date(d) => *d,
        FieldValue::DateTime(dt) => dt.date(),
        FieldValue::Timestamp(ts) => ts.date_naive(),
        FieldValue::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()?,
        _ => return None,
    };
    Some(FieldValue::Date(date))
}

fn to_datetime(value: &FieldValue) -> Option<FieldValue> {
    let datetime = match value {
        FieldValue::DateTime(dt) => *dt,
        FieldValue::Date(d) => d.and_hms_opt(0, 0, 0)?,
        FieldValue::Timestamp(ts) => ts.naive_local(),
        FieldValue::String(s) => DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s.trim(), format).ok())?,
        _ => return None,
    };
    Some(FieldValue::DateTime(datetime))
}

fn to_time(value: &FieldValue) -> Option<FieldValue> {
    let time = match value {
        FieldValue::Time(t) => *t,
        FieldValue::DateTime(dt) => dt.time(),
        FieldValue::String(s) => TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(s.trim(), format).ok())?,
        _ => return None,
    };
    Some(FieldValue::Time(time))
}

fn to_timestamp(value: &FieldValue) -> Option<FieldValue> {
    let timestamp: DateTime<FixedOffset> = match value {
        FieldValue::Timestamp(ts) => *ts,
        FieldValue::String(s) => DateTime::parse_from_rfc3339(s.trim()).ok()?,
        // seconds since the Unix epoch
        FieldValue::Integer(secs) => DateTime::<Utc>::from_timestamp(*secs, 0)?.into(),
        _ => return None,
    };
    Some(FieldValue::Timestamp(timestamp))
}
