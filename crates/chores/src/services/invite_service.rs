//! Invite service for inviting, claiming and revoking family memberships.
//!
//! Pending members live under their email key. Two lookup paths find them:
//! the email-keyed document and a member query on `email`, which also
//! catches legacy invites stored under random ids. The top-level
//! `invitations/{emailKey}` index lets sign-in discover families without a
//! collection-group query.

use std::collections::BTreeSet;

use chorely_firestore::{fields, Query};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::db::Db;
use crate::entities::{
    Family, InvitationIndex, Member, MemberRole, MemberStatus, PendingInvitation,
};
use crate::services::{ChoreService, MemberService};
use crate::types::{Actor, ChoreError, ChoreResult, InviteRequest};
use crate::utils::{paths, Validator};

/// Service for family invitation operations
pub struct InviteService<'s, 'a> {
    db: &'s mut Db<'a>,
}

impl<'s, 'a> InviteService<'s, 'a> {
    pub fn new(db: &'s mut Db<'a>) -> Self {
        Self { db }
    }

    /// Invites or re-invites `email` into a family.
    ///
    /// An existing email-keyed invite is refreshed in place. A legacy invite
    /// is rewritten under the email key and the legacy document deleted, so
    /// repeated re-invites migrate it once.
    pub async fn invite(&mut self, actor: &Actor, request: InviteRequest) -> ChoreResult<Member> {
        let email = Validator::email(&request.email)?;
        let role = request
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|raw| {
                MemberRole::parse(raw).ok_or_else(|| ChoreError::InvalidRole {
                    role: raw.to_string(),
                })
            })
            .transpose()?;
        let name = Validator::name(request.name.as_deref());
        let family_id = request.family_id.as_str();

        MemberService::new(self.db)
            .require_admin(family_id, &actor.uid)
            .await?;

        let key = Validator::email_key(&email);
        let keyed = MemberService::new(self.db).get(family_id, &key).await?;
        let matches = MemberService::new(self.db)
            .find_by_email(family_id, &email)
            .await?;

        if keyed.iter().chain(matches.iter()).any(Member::is_active) {
            return Err(ChoreError::AlreadyMember);
        }

        let now = Utc::now();
        let legacy: Vec<Member> = matches
            .into_iter()
            .filter(|member| member.id != key && member.is_legacy_invite())
            .collect();

        let member = match keyed {
            Some(mut existing) => {
                if let Some(name) = name {
                    existing.name = name;
                }
                if let Some(role) = role {
                    existing.role = role;
                }
                existing.invited_by = Some(actor.uid.clone());
                existing.updated_at = Some(now);

                self.db
                    .set(
                        &paths::member(family_id, &key),
                        fields! {
                            "name" => &existing.name,
                            "role" => existing.role.as_str(),
                            "invitedBy" => existing.invited_by.clone(),
                            "updatedAt" => now,
                        },
                        Some(&["name", "role", "invitedBy", "updatedAt"][..]),
                    )
                    .await?;
                debug!(family = family_id, member = %key, "refreshed pending invite");
                existing
            }
            None => {
                let base = legacy.first();
                let member = Member {
                    id: key.clone(),
                    uid: None,
                    name: name
                        .or_else(|| base.map(|legacy| legacy.name.clone()))
                        .unwrap_or_default(),
                    email: Some(email.clone()),
                    role: role
                        .or_else(|| base.map(|legacy| legacy.role))
                        .unwrap_or(MemberRole::Player),
                    status: MemberStatus::Invited,
                    coins: base.map(|legacy| legacy.coins).unwrap_or(0),
                    cosmetics: base.map(|legacy| legacy.cosmetics.clone()).unwrap_or_default(),
                    invited_by: Some(actor.uid.clone()),
                    created_at: base.and_then(|legacy| legacy.created_at).or(Some(now)),
                    updated_at: Some(now),
                    joined_at: None,
                };
                self.db
                    .set(&paths::member(family_id, &key), member.to_fields(), None)
                    .await?;
                member
            }
        };

        for stale in &legacy {
            ChoreService::new(self.db)
                .reassign(family_id, &stale.id, &key)
                .await?;
            self.db.delete(&paths::member(family_id, &stale.id)).await?;
            info!(family = family_id, legacy = %stale.id, member = %key, "migrated legacy invite");
        }

        self.add_to_index(&email, &key, family_id).await?;
        info!(family = family_id, email = %email, "invited member");
        Ok(member)
    }

    /// Pending invitations addressed to the caller's email.
    pub async fn pending_for(&mut self, actor: &Actor) -> ChoreResult<Vec<PendingInvitation>> {
        let Some(email) = caller_email(actor) else {
            return Ok(Vec::new());
        };

        let mut pending = Vec::new();
        for family_id in self.candidate_families(&email).await? {
            let Some(member) = self.find_pending(&family_id, &email).await? else {
                continue;
            };
            let family_name = match self.db.get(&paths::family(&family_id)).await {
                Ok(Some(document)) => Family::from_document(&document).name,
                Ok(None) => continue,
                Err(error) => {
                    debug!(family = %family_id, error = %error, "family not readable for invitee");
                    String::new()
                }
            };

            pending.push(PendingInvitation {
                family_id,
                family_name,
                member_id: member.id,
                email: email.clone(),
                name: member.name,
                role: member.role,
                invited_by: member.invited_by,
            });
        }
        Ok(pending)
    }

    /// Turns the caller's pending invite into an active, uid-keyed
    /// membership. The caller's email must be verified.
    pub async fn claim(&mut self, actor: &Actor, family_id: &str) -> ChoreResult<Member> {
        if actor.email.is_some() && !actor.email_verified {
            return Err(ChoreError::forbidden("email address is not verified"));
        }
        let email = caller_email(actor).ok_or(ChoreError::InvalidEmail)?;
        if family_id.trim().is_empty() {
            return Err(ChoreError::invalid_request("familyId is required"));
        }

        let pending = self.find_pending(family_id, &email).await?;
        let existing = MemberService::new(self.db)
            .get(family_id, &actor.uid)
            .await?
            .filter(Member::is_active);

        let member = match (existing, pending) {
            (Some(existing), pending) => {
                if let Some(pending) = pending {
                    ChoreService::new(self.db)
                        .reassign(family_id, &pending.id, &existing.id)
                        .await?;
                    self.db.delete(&paths::member(family_id, &pending.id)).await?;
                }
                existing
            }
            (None, Some(pending)) => {
                let now = Utc::now();
                let member = Member {
                    id: actor.uid.clone(),
                    uid: Some(actor.uid.clone()),
                    name: if pending.name.is_empty() {
                        actor.name.clone().unwrap_or_default()
                    } else {
                        pending.name.clone()
                    },
                    email: Some(email.clone()),
                    status: MemberStatus::Active,
                    updated_at: Some(now),
                    joined_at: Some(now),
                    ..pending.clone()
                };
                self.db
                    .set(&paths::member(family_id, &member.id), member.to_fields(), None)
                    .await?;
                ChoreService::new(self.db)
                    .reassign(family_id, &pending.id, &member.id)
                    .await?;
                self.db.delete(&paths::member(family_id, &pending.id)).await?;
                member
            }
            (None, None) => return Err(ChoreError::not_found("invitation")),
        };

        MemberService::new(self.db)
            .attach_user(&actor.uid, family_id)
            .await?;
        MemberService::new(self.db)
            .drop_from_index(&email, family_id)
            .await?;

        info!(family = family_id, uid = %actor.uid, "claimed invitation");
        Ok(member)
    }

    /// Claims every pending invite of the caller. Failures in one family are
    /// logged and skipped. Returns the joined family ids.
    pub async fn reconcile(&mut self, actor: &Actor) -> ChoreResult<Vec<String>> {
        let Some(email) = caller_email(actor) else {
            return Ok(Vec::new());
        };

        let mut joined = Vec::new();
        for family_id in self.candidate_families(&email).await? {
            match self.claim(actor, &family_id).await {
                Ok(_) => joined.push(family_id),
                Err(ChoreError::NotFound { .. }) => {
                    debug!(family = %family_id, "no pending invite left to claim");
                }
                Err(error @ ChoreError::ReauthRequired { .. }) => return Err(error),
                Err(error) => {
                    warn!(family = %family_id, error = %error, "failed to claim invitation");
                }
            }
        }
        Ok(joined)
    }

    /// Deletes every pending invite for `email` in a family.
    pub async fn revoke(&mut self, actor: &Actor, family_id: &str, email: &str) -> ChoreResult<()> {
        let email = Validator::email(email)?;
        MemberService::new(self.db)
            .require_admin(family_id, &actor.uid)
            .await?;

        let key = Validator::email_key(&email);
        let mut targets = BTreeSet::new();
        if let Some(member) = MemberService::new(self.db).get(family_id, &key).await? {
            if !member.is_active() {
                targets.insert(member.id);
            }
        }
        for member in MemberService::new(self.db)
            .find_by_email(family_id, &email)
            .await?
        {
            if !member.is_active() {
                targets.insert(member.id);
            }
        }

        if targets.is_empty() {
            return Err(ChoreError::not_found("invitation"));
        }
        for member_id in &targets {
            self.db.delete(&paths::member(family_id, member_id)).await?;
        }
        MemberService::new(self.db)
            .drop_from_index(&email, family_id)
            .await?;

        info!(family = family_id, email = %email, removed = targets.len(), "revoked invitation");
        Ok(())
    }

    /// The invited member document for `email`: the email-keyed one first,
    /// then any invited member whose `email` matches.
    async fn find_pending(&mut self, family_id: &str, email: &str) -> ChoreResult<Option<Member>> {
        let key = Validator::email_key(email);
        if let Some(member) = MemberService::new(self.db).get(family_id, &key).await? {
            if !member.is_active() {
                return Ok(Some(member));
            }
        }

        Ok(MemberService::new(self.db)
            .find_by_email(family_id, email)
            .await?
            .into_iter()
            .find(|member| !member.is_active()))
    }

    /// Family ids from the invitation index and a collection-group query on
    /// invited members.
    async fn candidate_families(&mut self, email: &str) -> ChoreResult<Vec<String>> {
        let mut families = BTreeSet::new();

        let index_path = paths::invitation(&Validator::email_key(email));
        match self.db.get(&index_path).await {
            Ok(Some(document)) => {
                families.extend(InvitationIndex::from_document(&document).family_ids);
            }
            Ok(None) => {}
            Err(error @ ChoreError::ReauthRequired { .. }) => return Err(error),
            Err(error) => warn!(error = %error, "invitation index lookup failed"),
        }

        let query = Query::collection_group("members")
            .where_eq("email", email)
            .where_eq("status", MemberStatus::Invited.as_str());
        match self.db.query("", &query).await {
            Ok(documents) => {
                families.extend(
                    documents
                        .iter()
                        .filter_map(|document| paths::family_of_member(document.path()))
                        .map(str::to_string),
                );
            }
            Err(error @ ChoreError::ReauthRequired { .. }) => return Err(error),
            Err(error) => warn!(error = %error, "invited member lookup failed"),
        }

        Ok(families.into_iter().collect())
    }

    async fn add_to_index(&mut self, email: &str, key: &str, family_id: &str) -> ChoreResult<()> {
        let path = paths::invitation(key);
        let mut index = match self.db.get(&path).await? {
            Some(document) => InvitationIndex::from_document(&document),
            None => InvitationIndex::default(),
        };
        index.email = email.to_string();
        if !index.family_ids.iter().any(|id| id == family_id) {
            index.family_ids.push(family_id.to_string());
        }
        self.db
            .set(&path, index.to_fields(Utc::now()), None)
            .await?;
        Ok(())
    }
}

/// The caller's normalised email, only when Firebase has verified it.
fn caller_email(actor: &Actor) -> Option<String> {
    if !actor.email_verified {
        return None;
    }
    actor
        .email
        .as_deref()
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
}
