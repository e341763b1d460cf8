use chorely_firestore::{fields, Document, Fields};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A household owning members and chores.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Family {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            name: document.string("name"),
            created_by: document.string("createdBy"),
            created_at: document.timestamp("createdAt"),
        }
    }

    pub fn to_fields(&self) -> Fields {
        fields! {
            "name" => &self.name,
            "createdBy" => &self.created_by,
            "createdAt" => self.created_at,
        }
    }
}
