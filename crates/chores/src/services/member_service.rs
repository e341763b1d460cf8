//! Member service for reading and managing family memberships.

use chorely_firestore::{fields, Query};
use chrono::Utc;
use tracing::{info, warn};

use crate::db::Db;
use crate::entities::{InvitationIndex, Member, MemberRole, UserProfile};
use crate::types::{Actor, ChoreError, ChoreResult, UpdateMemberRequest};
use crate::utils::{paths, PermissionChecker, Validator};

/// Service for family membership operations
pub struct MemberService<'s, 'a> {
    db: &'s mut Db<'a>,
}

impl<'s, 'a> MemberService<'s, 'a> {
    pub fn new(db: &'s mut Db<'a>) -> Self {
        Self { db }
    }

    pub async fn get(&mut self, family_id: &str, member_id: &str) -> ChoreResult<Option<Member>> {
        let document = self.db.get(&paths::member(family_id, member_id)).await?;
        Ok(document.as_ref().map(Member::from_document))
    }

    /// Active and invited members, admins first, then by name.
    pub async fn list(&mut self, family_id: &str) -> ChoreResult<Vec<Member>> {
        let mut members: Vec<Member> = self
            .db
            .list(&paths::members(family_id))
            .await?
            .iter()
            .map(Member::from_document)
            .collect();

        members.sort_by(|a, b| {
            b.is_active()
                .cmp(&a.is_active())
                .then(b.is_admin().cmp(&a.is_admin()))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(members)
    }

    /// Members of `family_id` whose stored email equals `email`.
    pub async fn find_by_email(&mut self, family_id: &str, email: &str) -> ChoreResult<Vec<Member>> {
        let query = Query::collection("members").where_eq("email", email);
        Ok(self
            .db
            .query(&paths::family(family_id), &query)
            .await?
            .iter()
            .map(Member::from_document)
            .collect())
    }

    /// The caller's active membership, or `forbidden`.
    pub async fn require_member(&mut self, family_id: &str, uid: &str) -> ChoreResult<Member> {
        if family_id.trim().is_empty() {
            return Err(ChoreError::invalid_request("familyId is required"));
        }
        match self.get(family_id, uid).await? {
            Some(member) if member.is_active() => Ok(member),
            _ => Err(ChoreError::forbidden("not a member of this family")),
        }
    }

    pub async fn require_admin(&mut self, family_id: &str, uid: &str) -> ChoreResult<Member> {
        let member = self.require_member(family_id, uid).await?;
        PermissionChecker::can_manage_family(&member)?;
        Ok(member)
    }

    pub async fn update(
        &mut self,
        actor: &Actor,
        member_id: &str,
        request: UpdateMemberRequest,
    ) -> ChoreResult<Member> {
        let family_id = request.family_id.as_str();
        let role = match request.role.as_deref() {
            Some(raw) => Some(MemberRole::parse(raw).ok_or_else(|| ChoreError::InvalidRole {
                role: raw.to_string(),
            })?),
            None => None,
        };
        let name = Validator::name(request.name.as_deref());

        self.require_admin(family_id, &actor.uid).await?;
        let mut member = self
            .get(family_id, member_id)
            .await?
            .ok_or_else(|| ChoreError::not_found("member"))?;

        if let Some(role) = role {
            if member.is_admin() && role != MemberRole::Admin && member.is_active() {
                self.ensure_other_admin(family_id, &member.id).await?;
            }
            member.role = role;
        }
        if let Some(name) = name {
            member.name = name;
        }
        member.updated_at = Some(Utc::now());

        self.db
            .set(
                &paths::member(family_id, &member.id),
                fields! {
                    "name" => &member.name,
                    "role" => member.role.as_str(),
                    "updatedAt" => member.updated_at,
                },
                Some(&["name", "role", "updatedAt"][..]),
            )
            .await?;

        info!(family = family_id, member = %member.id, role = member.role.as_str(), "updated member");
        Ok(member)
    }

    pub async fn remove(&mut self, actor: &Actor, family_id: &str, member_id: &str) -> ChoreResult<()> {
        self.require_admin(family_id, &actor.uid).await?;
        if member_id == actor.uid {
            return Err(ChoreError::CannotRemoveSelf);
        }

        let member = self
            .get(family_id, member_id)
            .await?
            .ok_or_else(|| ChoreError::not_found("member"))?;
        if member.is_admin() && member.is_active() {
            self.ensure_other_admin(family_id, &member.id).await?;
        }

        self.db.delete(&paths::member(family_id, &member.id)).await?;

        if let Some(uid) = member.uid.as_deref().filter(|_| member.is_active()) {
            if let Err(error) = self.detach_user(uid, family_id).await {
                warn!(family = family_id, uid, error = %error, "could not update removed user's families");
            }
        } else if let Some(email) = member.email.as_deref() {
            self.drop_from_index(email, family_id).await?;
        }

        info!(family = family_id, member = member_id, "removed member");
        Ok(())
    }

    /// Adds `family_id` to the user's `familyIds`.
    pub async fn attach_user(&mut self, uid: &str, family_id: &str) -> ChoreResult<()> {
        let path = paths::user(uid);
        let mut family_ids = match self.db.get(&path).await? {
            Some(document) => UserProfile::from_document(&document).family_ids,
            None => Vec::new(),
        };
        if family_ids.iter().any(|id| id == family_id) {
            return Ok(());
        }
        family_ids.push(family_id.to_string());

        self.db
            .set(
                &path,
                fields! { "familyIds" => family_ids, "updatedAt" => Utc::now() },
                Some(&["familyIds", "updatedAt"][..]),
            )
            .await?;
        Ok(())
    }

    async fn detach_user(&mut self, uid: &str, family_id: &str) -> ChoreResult<()> {
        let path = paths::user(uid);
        let Some(document) = self.db.get(&path).await? else {
            return Ok(());
        };
        let mut family_ids = UserProfile::from_document(&document).family_ids;
        family_ids.retain(|id| id != family_id);

        self.db
            .set(
                &path,
                fields! { "familyIds" => family_ids, "updatedAt" => Utc::now() },
                Some(&["familyIds", "updatedAt"][..]),
            )
            .await?;
        Ok(())
    }

    /// Removes `family_id` from the invitation index of `email`, deleting the
    /// index document once it lists no family.
    pub async fn drop_from_index(&mut self, email: &str, family_id: &str) -> ChoreResult<()> {
        let path = paths::invitation(&Validator::email_key(email));
        let Some(document) = self.db.get(&path).await? else {
            return Ok(());
        };

        let mut index = InvitationIndex::from_document(&document);
        let before = index.family_ids.len();
        index.family_ids.retain(|id| id != family_id);
        if index.family_ids.len() == before {
            return Ok(());
        }

        if index.family_ids.is_empty() {
            self.db.delete(&path).await
        } else {
            self.db
                .set(&path, index.to_fields(Utc::now()), None)
                .await
                .map(|_| ())
        }
    }

    async fn ensure_other_admin(&mut self, family_id: &str, member_id: &str) -> ChoreResult<()> {
        let others = self
            .list(family_id)
            .await?
            .into_iter()
            .filter(|member| member.is_active() && member.is_admin() && member.id != member_id)
            .count();
        if others == 0 {
            return Err(ChoreError::LastAdmin);
        }
        Ok(())
    }
}
