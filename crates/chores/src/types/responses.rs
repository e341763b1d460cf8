//! Composite results returned by the services.

use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{CosmeticItem, Family, Member, UserProfile};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChoreCounts {
    pub open: usize,
    pub submitted: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FamilySummary {
    pub family: Family,
    pub members: Vec<Member>,
    pub chore_counts: ChoreCounts,
    /// The caller's own membership.
    pub me: Member,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInOutcome {
    pub user: UserProfile,
    /// Families joined by claiming pending invitations during this sign-in.
    pub joined_family_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseOutcome {
    pub item: CosmeticItem,
    pub member: Member,
}
