//! Family service for creating households and summarising them.

use chrono::Utc;
use once_cell::sync::Lazy;
use tracing::info;

use crate::db::Db;
use crate::entities::{Chore, ChoreStatus, Family, Member, MemberRole, MemberStatus, UserProfile};
use crate::services::MemberService;
use crate::types::{Actor, ChoreCounts, ChoreError, ChoreResult, CreateFamilyRequest, FamilySummary};
use crate::utils::{paths, Validator};

static CUID: Lazy<cuid2::CuidConstructor> = Lazy::new(cuid2::CuidConstructor::new);

/// Service for family operations
pub struct FamilyService<'s, 'a> {
    db: &'s mut Db<'a>,
}

impl<'s, 'a> FamilyService<'s, 'a> {
    pub fn new(db: &'s mut Db<'a>) -> Self {
        Self { db }
    }

    /// Creates a family with the caller as its first active admin.
    pub async fn create(
        &mut self,
        actor: &Actor,
        request: CreateFamilyRequest,
    ) -> ChoreResult<(Family, Member)> {
        let name = Validator::name(Some(request.name.as_str()))
            .ok_or_else(|| ChoreError::invalid_request("family name is required"))?;
        let now = Utc::now();

        let family = Family {
            id: CUID.create_id(),
            name,
            created_by: actor.uid.clone(),
            created_at: Some(now),
        };
        self.db
            .create("families", Some(family.id.as_str()), family.to_fields())
            .await?;

        let member = Member {
            id: actor.uid.clone(),
            uid: Some(actor.uid.clone()),
            name: Validator::name(request.member_name.as_deref())
                .or_else(|| actor.name.clone())
                .unwrap_or_default(),
            email: actor.email.as_deref().map(str::to_lowercase),
            role: MemberRole::Admin,
            status: MemberStatus::Active,
            coins: 0,
            cosmetics: Vec::new(),
            invited_by: None,
            created_at: Some(now),
            updated_at: Some(now),
            joined_at: Some(now),
        };
        self.db
            .set(&paths::member(&family.id, &member.id), member.to_fields(), None)
            .await?;

        MemberService::new(self.db)
            .attach_user(&actor.uid, &family.id)
            .await?;

        info!(family = %family.id, uid = %actor.uid, "created family");
        Ok((family, member))
    }

    /// Family overview for a member. Without `family_id` the caller's first
    /// family is used.
    pub async fn summary(
        &mut self,
        actor: &Actor,
        family_id: Option<&str>,
    ) -> ChoreResult<FamilySummary> {
        let family_id = match family_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => self.first_family(&actor.uid).await?,
        };

        let me = MemberService::new(self.db)
            .require_member(&family_id, &actor.uid)
            .await?;

        let family = self
            .db
            .get(&paths::family(&family_id))
            .await?
            .map(|document| Family::from_document(&document))
            .ok_or_else(|| ChoreError::not_found("family"))?;

        let members = MemberService::new(self.db).list(&family_id).await?;

        let mut chore_counts = ChoreCounts::default();
        for document in self.db.list(&paths::chores(&family_id)).await? {
            let chore = Chore::from_document(&family_id, &document);
            if chore.deleted {
                continue;
            }
            match chore.status {
                ChoreStatus::Open => chore_counts.open += 1,
                ChoreStatus::Submitted => chore_counts.submitted += 1,
                ChoreStatus::Approved => chore_counts.approved += 1,
                ChoreStatus::Rejected => chore_counts.rejected += 1,
            }
        }

        Ok(FamilySummary {
            family,
            members,
            chore_counts,
            me,
        })
    }

    async fn first_family(&mut self, uid: &str) -> ChoreResult<String> {
        self.db
            .get(&paths::user(uid))
            .await?
            .map(|document| UserProfile::from_document(&document).family_ids)
            .and_then(|ids| ids.into_iter().next())
            .ok_or_else(|| ChoreError::not_found("family"))
    }
}
