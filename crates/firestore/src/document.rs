use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as Json;

use crate::error::{FirestoreError, FirestoreResult};
use crate::value::{fields_from_json, Fields, Value};

/// A Firestore document as returned by the REST API.
///
/// The read helpers never fail: absent or mistyped fields fall back to an
/// empty string, zero, `false` or an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/(default)/documents/{path}`.
    pub name: String,
    pub id: String,
    pub fields: Fields,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Option<Json>,
    #[serde(default)]
    create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    update_time: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(name: impl Into<String>, fields: Fields) -> Self {
        let name = name.into();
        let id = last_segment(&name).to_string();
        Self {
            name,
            id,
            fields,
            create_time: None,
            update_time: None,
        }
    }

    pub fn from_json(json: Json) -> FirestoreResult<Self> {
        let raw: RawDocument = serde_json::from_value(json)
            .map_err(|error| FirestoreError::Decode(error.to_string()))?;

        let fields = raw.fields.as_ref().map(fields_from_json).unwrap_or_default();
        let mut document = Self::new(raw.name, fields);
        document.create_time = raw.create_time;
        document.update_time = raw.update_time;
        Ok(document)
    }

    /// Path relative to the database root, e.g. `families/f1/members/m1`.
    pub fn path(&self) -> &str {
        match self.name.find("/documents/") {
            Some(index) => &self.name[index + "/documents/".len()..],
            None => &self.name,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn string(&self, key: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Like [`Document::string`] but treats an empty string as absent.
    pub fn opt_string(&self, key: &str) -> Option<String> {
        Some(self.string(key)).filter(|value| !value.is_empty())
    }

    pub fn integer(&self, key: &str) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn boolean(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key) {
            Some(Value::Timestamp(at)) => Some(*at),
            Some(Value::String(text)) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|parsed| parsed.with_timezone(&Utc)),
            _ => None,
        }
    }

    pub fn string_array(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chore_document() -> Document {
        Document::from_json(json!({
            "name": "projects/demo/databases/(default)/documents/families/f1/chores/c1",
            "fields": {
                "title": { "stringValue": "Feed the cat" },
                "coinValue": { "integerValue": "3" },
                "deleted": { "booleanValue": false },
                "labels": { "arrayValue": { "values": [{ "stringValue": "pets" }, { "integerValue": "1" }] } },
                "coinTypo": { "stringValue": "three" }
            },
            "createTime": "2024-05-01T08:00:00.123456Z",
            "updateTime": "2024-05-02T08:00:00Z"
        }))
        .expect("document should decode")
    }

    #[test]
    fn decodes_identity_and_path() {
        let document = chore_document();
        assert_eq!(document.id, "c1");
        assert_eq!(document.path(), "families/f1/chores/c1");
        assert!(document.create_time.is_some());
        assert!(document.update_time.is_some());
    }

    #[test]
    fn read_helpers_default_missing_or_mistyped_fields() {
        let document = chore_document();
        assert_eq!(document.string("title"), "Feed the cat");
        assert_eq!(document.integer("coinValue"), 3);
        assert_eq!(document.integer("coinTypo"), 0);
        assert_eq!(document.integer("missing"), 0);
        assert_eq!(document.string("coinValue"), "");
        assert!(!document.boolean("deleted"));
        assert!(!document.boolean("title"));
        assert_eq!(document.string_array("labels"), vec!["pets".to_string()]);
        assert!(document.string_array("title").is_empty());
        assert_eq!(document.opt_string("missing"), None);
        assert_eq!(document.timestamp("title"), None);
    }

    #[test]
    fn document_without_fields_decodes_empty() {
        let document = Document::from_json(json!({
            "name": "projects/demo/databases/(default)/documents/users/u1"
        }))
        .unwrap();
        assert!(document.fields.is_empty());
        assert_eq!(document.id, "u1");
    }

    #[test]
    fn missing_name_is_a_decode_error() {
        let error = Document::from_json(json!({ "fields": {} })).unwrap_err();
        assert!(matches!(error, FirestoreError::Decode(_)));
    }
}
