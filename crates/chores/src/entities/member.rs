use chorely_firestore::{fields, Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::paths::EMAIL_KEY_PREFIX;

/// Permission level inside a family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    #[default]
    Player,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Player => "player",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "player" => Some(Self::Player),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    #[default]
    Invited,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Invited => "invited",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("active") {
            Self::Active
        } else {
            Self::Invited
        }
    }
}

/// Membership record at `families/{familyId}/members/{memberId}`.
///
/// Active members are keyed by uid, invited ones by their email key. Older
/// invites may still sit under a random id.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub uid: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub coins: i64,
    pub cosmetics: Vec<String>,
    pub invited_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Member {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            uid: document.opt_string("uid"),
            name: document.string("name"),
            email: document.opt_string("email"),
            role: MemberRole::parse(&document.string("role")).unwrap_or_default(),
            status: MemberStatus::parse(&document.string("status")),
            coins: document.integer("coins").max(0),
            cosmetics: document.string_array("cosmetics"),
            invited_by: document.opt_string("invitedBy"),
            created_at: document.timestamp("createdAt"),
            updated_at: document.timestamp("updatedAt"),
            joined_at: document.timestamp("joinedAt"),
        }
    }

    pub fn to_fields(&self) -> Fields {
        fields! {
            "uid" => self.uid.clone(),
            "name" => &self.name,
            "email" => self.email.clone(),
            "role" => self.role.as_str(),
            "status" => self.status.as_str(),
            "coins" => self.coins,
            "cosmetics" => self.cosmetics.clone(),
            "invitedBy" => self.invited_by.clone(),
            "createdAt" => self.created_at,
            "updatedAt" => self.updated_at,
            "joinedAt" => self.joined_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, MemberRole::Admin)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, MemberStatus::Active)
    }

    /// An invite stored under a random id instead of its email key.
    pub fn is_legacy_invite(&self) -> bool {
        !self.is_active() && !self.id.starts_with(EMAIL_KEY_PREFIX)
    }

    pub fn owns(&self, item_id: &str) -> bool {
        self.cosmetics.iter().any(|owned| owned == item_id)
    }
}
