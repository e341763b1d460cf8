//! Typed field values and their Firestore REST wire representation.
//!
//! Firestore encodes every field as a single-key object naming the value
//! kind, e.g. `{"integerValue": "42"}`. Integers travel as decimal strings.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value as Json};
use tracing::debug;

/// Field name to value mapping of a document or map value.
pub type Fields = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    Array(Vec<Value>),
    Map(Fields),
}

impl Value {
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => json!({ "nullValue": null }),
            Value::Boolean(value) => json!({ "booleanValue": value }),
            Value::Integer(value) => json!({ "integerValue": value.to_string() }),
            Value::Double(value) => json!({ "doubleValue": value }),
            Value::Timestamp(value) => {
                json!({ "timestampValue": value.to_rfc3339_opts(SecondsFormat::Micros, true) })
            }
            Value::String(value) => json!({ "stringValue": value }),
            Value::Array(values) => {
                let values: Vec<Json> = values.iter().map(Value::to_json).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Value::Map(fields) => json!({ "mapValue": { "fields": fields_to_json(fields) } }),
        }
    }

    /// Decodes one wire value. Unsupported kinds (references, geo points,
    /// bytes) and malformed payloads decode to `None`.
    pub fn from_json(json: &Json) -> Option<Value> {
        let object = json.as_object()?;
        let (kind, inner) = object.iter().next()?;

        match kind.as_str() {
            "nullValue" => Some(Value::Null),
            "booleanValue" => inner.as_bool().map(Value::Boolean),
            "integerValue" => match inner {
                Json::String(text) => text.parse().ok().map(Value::Integer),
                Json::Number(number) => number.as_i64().map(Value::Integer),
                _ => None,
            },
            "doubleValue" => inner.as_f64().map(Value::Double),
            "timestampValue" => inner
                .as_str()
                .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
                .map(|parsed| Value::Timestamp(parsed.with_timezone(&Utc))),
            "stringValue" => inner.as_str().map(|text| Value::String(text.to_string())),
            "arrayValue" => {
                let values = inner
                    .get("values")
                    .and_then(Json::as_array)
                    .map(|items| items.iter().filter_map(Value::from_json).collect())
                    .unwrap_or_default();
                Some(Value::Array(values))
            }
            "mapValue" => Some(Value::Map(
                inner.get("fields").map(fields_from_json).unwrap_or_default(),
            )),
            other => {
                debug!(kind = other, "skipping unsupported firestore value kind");
                None
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            Value::Double(value) if value.is_finite() => Some(*value as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

pub fn fields_to_json(fields: &Fields) -> Json {
    let map: Map<String, Json> = fields
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect();
    Json::Object(map)
}

pub fn fields_from_json(json: &Json) -> Fields {
    json.as_object()
        .map(|object| {
            object
                .iter()
                .filter_map(|(key, value)| Value::from_json(value).map(|v| (key.clone(), v)))
                .collect()
        })
        .unwrap_or_default()
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::Array(values.into_iter().map(Value::String).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Builds a [`Fields`] map from `key => value` pairs.
///
/// ```
/// use chorely_firestore::{fields, Value};
///
/// let fields = fields! { "title" => "Dishes", "coinValue" => 5i64 };
/// assert_eq!(fields["coinValue"], Value::Integer(5));
/// ```
#[macro_export]
macro_rules! fields {
    () => { $crate::Fields::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(fields.insert(($key).to_string(), $crate::Value::from($value));)+
        fields
    }};
}
