use chorely_auth::UserRole;
use chorely_firestore::{fields, Document, Fields};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Profile document at `users/{uid}`. Firebase tokens are never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[schema(value_type = String, example = "parent")]
    pub role: UserRole,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub family_ids: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn from_document(document: &Document) -> Self {
        Self {
            uid: document.id.clone(),
            role: UserRole::parse(&document.string("role")).unwrap_or_default(),
            email: document.opt_string("email"),
            name: document.opt_string("name"),
            picture: document.opt_string("picture"),
            family_ids: document.string_array("familyIds"),
            created_at: document.timestamp("createdAt"),
            updated_at: document.timestamp("updatedAt"),
        }
    }

    pub fn to_fields(&self) -> Fields {
        fields! {
            "role" => self.role.as_str(),
            "email" => self.email.clone(),
            "name" => self.name.clone(),
            "picture" => self.picture.clone(),
            "familyIds" => self.family_ids.clone(),
            "createdAt" => self.created_at,
            "updatedAt" => self.updated_at,
        }
    }
}
