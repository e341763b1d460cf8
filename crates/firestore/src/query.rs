use serde_json::{json, Value as Json};

use crate::value::Value;

/// A structured query restricted to what the app needs: equality filters
/// joined with AND over one collection (or collection group) and a limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub all_descendants: bool,
    pub filters: Vec<(String, Value)>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            all_descendants: false,
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Matches every collection with this id below the query parent.
    pub fn collection_group(collection: impl Into<String>) -> Self {
        Self {
            all_descendants: true,
            ..Self::collection(collection)
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_json(&self) -> Json {
        let mut structured = json!({
            "from": [{
                "collectionId": self.collection,
                "allDescendants": self.all_descendants,
            }]
        });

        let mut filters: Vec<Json> = self
            .filters
            .iter()
            .map(|(field, value)| {
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": value.to_json(),
                    }
                })
            })
            .collect();

        match filters.len() {
            0 => {}
            1 => structured["where"] = filters.remove(0),
            _ => {
                structured["where"] = json!({
                    "compositeFilter": { "op": "AND", "filters": filters }
                })
            }
        }

        if let Some(limit) = self.limit {
            structured["limit"] = json!(limit);
        }

        json!({ "structuredQuery": structured })
    }

    pub fn matches(&self, fields: &crate::Fields) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_filter_is_not_wrapped_in_composite() {
        let query = Query::collection("members").where_eq("email", "kid@example.com");
        let body = query.to_json();
        let filter = &body["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(filter["field"]["fieldPath"], "email");
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["value"]["stringValue"], "kid@example.com");
        assert_eq!(body["structuredQuery"]["from"][0]["allDescendants"], false);
    }

    #[test]
    fn multiple_filters_and_limit() {
        let body = Query::collection_group("members")
            .where_eq("email", "kid@example.com")
            .where_eq("status", "invited")
            .limit(10)
            .to_json();
        let structured = &body["structuredQuery"];
        assert_eq!(structured["from"][0]["allDescendants"], true);
        assert_eq!(structured["where"]["compositeFilter"]["op"], "AND");
        assert_eq!(
            structured["where"]["compositeFilter"]["filters"]
                .as_array()
                .map(Vec::len),
            Some(2)
        );
        assert_eq!(structured["limit"], 10);
    }
}
