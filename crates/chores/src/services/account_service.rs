//! Account service for sign-in bookkeeping.

use chorely_auth::{FirebaseAccount, UserRole};
use chorely_firestore::fields;
use chrono::Utc;
use tracing::info;

use crate::db::Db;
use crate::entities::UserProfile;
use crate::services::InviteService;
use crate::types::{Actor, ChoreError, ChoreResult, SignInOutcome};
use crate::utils::paths;

/// Service for user profiles and sign-in reconciliation
pub struct AccountService<'s, 'a> {
    db: &'s mut Db<'a>,
}

impl<'s, 'a> AccountService<'s, 'a> {
    pub fn new(db: &'s mut Db<'a>) -> Self {
        Self { db }
    }

    /// Upserts `users/{uid}` from the Firebase account and claims every
    /// pending invitation addressed to its email.
    ///
    /// `requested_role` only applies to new profiles.
    pub async fn sign_in(
        &mut self,
        account: &FirebaseAccount,
        requested_role: Option<UserRole>,
    ) -> ChoreResult<SignInOutcome> {
        if account.uid != self.db.uid() {
            return Err(ChoreError::forbidden("account does not match credentials"));
        }

        let path = paths::user(&account.uid);
        let now = Utc::now();
        let email = account.email.as_deref().map(str::to_lowercase);

        match self.db.get(&path).await? {
            Some(_) => {
                self.db
                    .set(
                        &path,
                        fields! {
                            "email" => email.clone(),
                            "name" => account.name.clone(),
                            "picture" => account.picture.clone(),
                            "updatedAt" => now,
                        },
                        Some(&["email", "name", "picture", "updatedAt"][..]),
                    )
                    .await?;
            }
            None => {
                let profile = UserProfile {
                    uid: account.uid.clone(),
                    role: requested_role.unwrap_or_default(),
                    email: email.clone(),
                    name: account.name.clone(),
                    picture: account.picture.clone(),
                    family_ids: Vec::new(),
                    created_at: Some(now),
                    updated_at: Some(now),
                };
                self.db.set(&path, profile.to_fields(), None).await?;
                info!(uid = %account.uid, role = profile.role.as_str(), "created user profile");
            }
        }

        let actor = Actor {
            uid: account.uid.clone(),
            email,
            email_verified: account.email_verified,
            name: account.name.clone(),
            picture: account.picture.clone(),
        };
        let joined_family_ids = InviteService::new(self.db).reconcile(&actor).await?;
        let user = self.profile(&account.uid).await?;

        Ok(SignInOutcome {
            user,
            joined_family_ids,
        })
    }

    pub async fn profile(&mut self, uid: &str) -> ChoreResult<UserProfile> {
        self.db
            .get(&paths::user(uid))
            .await?
            .map(|document| UserProfile::from_document(&document))
            .ok_or_else(|| ChoreError::not_found("user"))
    }
}
