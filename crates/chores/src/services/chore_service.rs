//! Chore service for the create / submit / review lifecycle.

use chorely_firestore::{fields, Query, Value};
use chrono::Utc;
use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::db::Db;
use crate::entities::{Chore, ChoreStatus};
use crate::services::{MemberService, SuggestionService};
use crate::types::{
    Actor, ChoreError, ChoreResult, CreateChoresRequest, ListChoresQuery, ReviewChoreRequest,
    ReviewDecision, UpdateChoreRequest,
};
use crate::utils::{paths, PermissionChecker, Validator};

static CUID: Lazy<cuid2::CuidConstructor> = Lazy::new(cuid2::CuidConstructor::new);

/// Service for chore operations
pub struct ChoreService<'s, 'a> {
    db: &'s mut Db<'a>,
}

impl<'s, 'a> ChoreService<'s, 'a> {
    pub fn new(db: &'s mut Db<'a>) -> Self {
        Self { db }
    }

    /// Non-deleted chores of a family, newest first.
    pub async fn list(&mut self, actor: &Actor, query: ListChoresQuery) -> ChoreResult<Vec<Chore>> {
        let status = match query.status.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(
                ChoreStatus::parse(raw)
                    .ok_or_else(|| ChoreError::invalid_request(format!("unknown status {raw}")))?,
            ),
            None => None,
        };
        let family_id = query.family_id.as_str();

        MemberService::new(self.db)
            .require_member(family_id, &actor.uid)
            .await?;

        let mut chores: Vec<Chore> = self
            .db
            .list(&paths::chores(family_id))
            .await?
            .iter()
            .map(|document| Chore::from_document(family_id, document))
            .filter(|chore| !chore.deleted)
            .filter(|chore| status.map_or(true, |status| chore.status == status))
            .filter(|chore| match query.assignee_id.as_deref() {
                Some(assignee) if !assignee.is_empty() => {
                    chore.assignee_id.as_deref() == Some(assignee)
                }
                _ => true,
            })
            .collect();

        chores.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(chores)
    }

    /// Creates one `Open` chore per non-blank description.
    pub async fn create(
        &mut self,
        actor: &Actor,
        request: CreateChoresRequest,
    ) -> ChoreResult<Vec<Chore>> {
        let titles = Validator::descriptions(&request.descriptions)?;
        let coin_value = Validator::coin_value(request.coin_value.unwrap_or(0))?;
        let due_date = Validator::due_date(request.due_date.as_deref())?;
        let family_id = request.family_id.as_str();

        MemberService::new(self.db)
            .require_admin(family_id, &actor.uid)
            .await?;
        let assignee_id = self
            .resolve_assignee(family_id, request.assignee_id.as_deref())
            .await?;

        let now = Utc::now();
        let mut created = Vec::with_capacity(titles.len());
        for title in &titles {
            let chore = Chore {
                id: CUID.create_id(),
                family_id: family_id.to_string(),
                title: title.clone(),
                status: ChoreStatus::Open,
                assignee_id: assignee_id.clone(),
                due_date: due_date.clone(),
                coin_value,
                deleted: false,
                created_by: actor.uid.clone(),
                created_at: Some(now),
                updated_at: Some(now),
                submitted_at: None,
                reviewed_at: None,
                reviewed_by: None,
                rejection_reason: None,
            };
            self.db
                .create(&paths::chores(family_id), Some(chore.id.as_str()), chore.to_fields())
                .await?;
            created.push(chore);
        }

        if let Err(error) = SuggestionService::new(self.db)
            .record_usage(family_id, &titles)
            .await
        {
            warn!(family = family_id, error = %error, "failed to update chore usage counters");
        }

        info!(family = family_id, count = created.len(), "created chores");
        Ok(created)
    }

    pub async fn update(
        &mut self,
        actor: &Actor,
        chore_id: &str,
        request: UpdateChoreRequest,
    ) -> ChoreResult<Chore> {
        let title = match request.title.as_deref() {
            Some(raw) => Some(
                Validator::descriptions(&[raw.to_string()])?
                    .into_iter()
                    .next()
                    .ok_or(ChoreError::DescriptionRequired)?,
            ),
            None => None,
        };
        let coin_value = request.coin_value.map(Validator::coin_value).transpose()?;
        let due_date = match request.due_date.as_deref() {
            Some(raw) => Some(Validator::due_date(Some(raw))?),
            None => None,
        };
        let family_id = request.family_id.as_str();

        MemberService::new(self.db)
            .require_admin(family_id, &actor.uid)
            .await?;
        let mut chore = self.load(family_id, chore_id).await?;
        if chore.status == ChoreStatus::Approved {
            return Err(ChoreError::invalid_request("approved chores cannot be edited"));
        }

        if let Some(title) = title {
            chore.title = title;
        }
        if let Some(coin_value) = coin_value {
            chore.coin_value = coin_value;
        }
        if let Some(due_date) = due_date {
            chore.due_date = due_date;
        }
        if let Some(raw) = request.assignee_id.as_deref() {
            chore.assignee_id = self.resolve_assignee(family_id, Some(raw)).await?;
        }
        chore.updated_at = Some(Utc::now());

        self.db
            .set(
                &paths::chore(family_id, &chore.id),
                chore.to_fields(),
                Some(&["title", "assigneeId", "dueDate", "coinValue", "updatedAt"][..]),
            )
            .await?;
        Ok(chore)
    }

    /// Marks an `Open` or `Rejected` chore as done. Allowed for the assignee
    /// and for admins.
    pub async fn submit(&mut self, actor: &Actor, family_id: &str, chore_id: &str) -> ChoreResult<Chore> {
        let member = MemberService::new(self.db)
            .require_member(family_id, &actor.uid)
            .await?;
        let mut chore = self.load(family_id, chore_id).await?;
        PermissionChecker::can_submit(&member, &chore)?;
        transition(&mut chore, ChoreStatus::Submitted)?;

        let now = Utc::now();
        chore.submitted_at = Some(now);
        chore.updated_at = Some(now);
        chore.rejection_reason = None;

        self.db
            .set(
                &paths::chore(family_id, &chore.id),
                fields! {
                    "status" => chore.status.as_str(),
                    "submittedAt" => now,
                    "updatedAt" => now,
                    "rejectionReason" => Value::Null,
                },
                Some(&["status", "submittedAt", "updatedAt", "rejectionReason"][..]),
            )
            .await?;

        info!(family = family_id, chore = chore_id, uid = %actor.uid, "submitted chore");
        Ok(chore)
    }

    /// Approves or rejects a submitted chore. Approval credits the chore's
    /// coin value to the assignee.
    pub async fn review(
        &mut self,
        actor: &Actor,
        chore_id: &str,
        request: ReviewChoreRequest,
    ) -> ChoreResult<Chore> {
        let family_id = request.family_id.as_str();
        MemberService::new(self.db)
            .require_admin(family_id, &actor.uid)
            .await?;
        let mut chore = self.load(family_id, chore_id).await?;

        let next = match request.decision {
            ReviewDecision::Approve => ChoreStatus::Approved,
            ReviewDecision::Reject => ChoreStatus::Rejected,
        };
        transition(&mut chore, next)?;

        let now = Utc::now();
        chore.reviewed_at = Some(now);
        chore.reviewed_by = Some(actor.uid.clone());
        chore.updated_at = Some(now);
        chore.rejection_reason = match request.decision {
            ReviewDecision::Reject => Validator::name(request.reason.as_deref()),
            ReviewDecision::Approve => None,
        };

        self.db
            .set(
                &paths::chore(family_id, &chore.id),
                fields! {
                    "status" => chore.status.as_str(),
                    "reviewedAt" => now,
                    "reviewedBy" => &actor.uid,
                    "updatedAt" => now,
                    "rejectionReason" => chore.rejection_reason.clone(),
                },
                Some(&["status", "reviewedAt", "reviewedBy", "updatedAt", "rejectionReason"][..]),
            )
            .await?;

        if next == ChoreStatus::Approved {
            self.credit_assignee(family_id, &chore).await?;
        }

        info!(family = family_id, chore = chore_id, status = chore.status.as_str(), "reviewed chore");
        Ok(chore)
    }

    /// Soft-deletes a chore.
    pub async fn delete(&mut self, actor: &Actor, family_id: &str, chore_id: &str) -> ChoreResult<()> {
        MemberService::new(self.db)
            .require_admin(family_id, &actor.uid)
            .await?;
        let chore = self.load(family_id, chore_id).await?;

        self.db
            .set(
                &paths::chore(family_id, &chore.id),
                fields! { "deleted" => true, "updatedAt" => Utc::now() },
                Some(&["deleted", "updatedAt"][..]),
            )
            .await?;

        info!(family = family_id, chore = chore_id, "deleted chore");
        Ok(())
    }

    /// Points every chore assigned to member `from` at member `to`. Used when
    /// a pending member document is replaced under a new id.
    pub async fn reassign(&mut self, family_id: &str, from: &str, to: &str) -> ChoreResult<usize> {
        if from == to {
            return Ok(0);
        }

        let query = Query::collection("chores").where_eq("assigneeId", from);
        let documents = self.db.query(&paths::family(family_id), &query).await?;
        let now = Utc::now();
        for document in &documents {
            self.db
                .set(
                    &paths::chore(family_id, &document.id),
                    fields! { "assigneeId" => to, "updatedAt" => now },
                    Some(&["assigneeId", "updatedAt"][..]),
                )
                .await?;
        }

        if !documents.is_empty() {
            info!(family = family_id, from, to, count = documents.len(), "reassigned chores");
        }
        Ok(documents.len())
    }

    /// Loads a chore; deleted chores are reported as missing.
    async fn load(&mut self, family_id: &str, chore_id: &str) -> ChoreResult<Chore> {
        self.db
            .get(&paths::chore(family_id, chore_id))
            .await?
            .map(|document| Chore::from_document(family_id, &document))
            .filter(|chore| !chore.deleted)
            .ok_or_else(|| ChoreError::not_found("chore"))
    }

    /// Blank clears the assignee; anything else must be a family member.
    async fn resolve_assignee(
        &mut self,
        family_id: &str,
        raw: Option<&str>,
    ) -> ChoreResult<Option<String>> {
        let Some(member_id) = raw.map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        MemberService::new(self.db)
            .get(family_id, member_id)
            .await?
            .map(|member| Some(member.id))
            .ok_or_else(|| ChoreError::not_found("member"))
    }

    async fn credit_assignee(&mut self, family_id: &str, chore: &Chore) -> ChoreResult<()> {
        let Some(assignee_id) = chore.assignee_id.as_deref() else {
            return Ok(());
        };
        if chore.coin_value == 0 {
            return Ok(());
        }

        let Some(member) = MemberService::new(self.db)
            .get(family_id, assignee_id)
            .await?
        else {
            warn!(family = family_id, member = assignee_id, "approved chore has no assignee to credit");
            return Ok(());
        };

        let coins = member.coins.saturating_add(chore.coin_value);
        self.db
            .set(
                &paths::member(family_id, &member.id),
                fields! { "coins" => coins, "updatedAt" => Utc::now() },
                Some(&["coins", "updatedAt"][..]),
            )
            .await?;

        info!(family = family_id, member = %member.id, credited = chore.coin_value, balance = coins, "credited coins");
        Ok(())
    }
}

fn transition(chore: &mut Chore, next: ChoreStatus) -> ChoreResult<()> {
    if !chore.status.can_transition_to(next) {
        return Err(ChoreError::InvalidTransition {
            from: chore.status,
            to: next,
        });
    }
    chore.status = next;
    Ok(())
}
