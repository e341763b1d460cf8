use std::fmt;

use chorely_firestore::{fields, Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of a chore.
///
/// `Open` and `Rejected` chores can be submitted; only `Submitted` chores can
/// be reviewed. `Approved` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChoreStatus {
    #[default]
    Open,
    Submitted,
    Approved,
    Rejected,
}

impl ChoreStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: ChoreStatus) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Submitted)
                | (Self::Rejected, Self::Submitted)
                | (Self::Submitted, Self::Approved)
                | (Self::Submitted, Self::Rejected)
        )
    }
}

impl fmt::Display for ChoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chore document at `families/{familyId}/chores/{choreId}`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Chore {
    pub id: String,
    pub family_id: String,
    pub title: String,
    pub status: ChoreStatus,
    pub assignee_id: Option<String>,
    /// Calendar date, `YYYY-MM-DD`.
    pub due_date: Option<String>,
    pub coin_value: i64,
    #[serde(skip)]
    pub deleted: bool,
    pub created_by: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub rejection_reason: Option<String>,
}

impl Chore {
    pub fn from_document(family_id: &str, document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            family_id: family_id.to_string(),
            title: document.string("title"),
            status: ChoreStatus::parse(&document.string("status")).unwrap_or_default(),
            assignee_id: document.opt_string("assigneeId"),
            due_date: document.opt_string("dueDate"),
            coin_value: document.integer("coinValue").max(0),
            deleted: document.boolean("deleted"),
            created_by: document.string("createdBy"),
            created_at: document.timestamp("createdAt"),
            updated_at: document.timestamp("updatedAt"),
            submitted_at: document.timestamp("submittedAt"),
            reviewed_at: document.timestamp("reviewedAt"),
            reviewed_by: document.opt_string("reviewedBy"),
            rejection_reason: document.opt_string("rejectionReason"),
        }
    }

    pub fn to_fields(&self) -> Fields {
        fields! {
            "title" => &self.title,
            "status" => self.status.as_str(),
            "assigneeId" => self.assignee_id.clone().unwrap_or_default(),
            "dueDate" => self.due_date.clone().unwrap_or_default(),
            "coinValue" => self.coin_value,
            "deleted" => self.deleted,
            "createdBy" => &self.created_by,
            "createdAt" => self.created_at,
            "updatedAt" => self.updated_at,
            "submittedAt" => self.submitted_at,
            "reviewedAt" => self.reviewed_at,
            "reviewedBy" => self.reviewed_by.clone(),
            "rejectionReason" => self.rejection_reason.clone(),
        }
    }
}

/// Usage counter at `families/{familyId}/choreUsage/{slug}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoreUsage {
    pub slug: String,
    pub title: String,
    pub count: i64,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ChoreUsage {
    pub fn from_document(document: &Document) -> Self {
        Self {
            slug: document.id.clone(),
            title: document.string("title"),
            count: document.integer("count"),
            last_used_at: document.timestamp("lastUsedAt"),
        }
    }

    pub fn to_fields(&self) -> Fields {
        fields! {
            "title" => &self.title,
            "count" => self.count,
            "lastUsedAt" => self.last_used_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChoreSuggestion {
    pub title: String,
    pub count: i64,
}
