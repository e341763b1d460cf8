use chorely_firestore::{fields, Document, Fields};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::MemberRole;

/// Lookup document at `invitations/{emailKey}` listing the families with a
/// pending invite for one address.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvitationIndex {
    pub email: String,
    pub family_ids: Vec<String>,
}

impl InvitationIndex {
    pub fn from_document(document: &Document) -> Self {
        Self {
            email: document.string("email"),
            family_ids: document.string_array("familyIds"),
        }
    }

    pub fn to_fields(&self, now: DateTime<Utc>) -> Fields {
        fields! {
            "email" => &self.email,
            "familyIds" => self.family_ids.clone(),
            "updatedAt" => now,
        }
    }
}

/// A pending invite addressed to the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingInvitation {
    pub family_id: String,
    pub family_name: String,
    pub member_id: String,
    pub email: String,
    pub name: String,
    pub role: MemberRole,
    pub invited_by: Option<String>,
}
