//! Integration tests for the chores crate against the in-memory store.

use async_trait::async_trait;
use chorely_auth::{FirebaseAccount, FirebaseCredentials, IdentityError, RefreshedTokens, TokenExchange};
use chorely_chores::types::{
    CreateChoresRequest, InviteRequest, ListChoresQuery, PurchaseRequest, ReviewChoreRequest,
    ReviewDecision,
};
use chorely_chores::{
    AccountService, Actor, ChoreError, ChoreService, ChoreStatus, Db, InviteService, MemberService,
    ShopService, SuggestionService,
};
use chorely_firestore::memory::{MemoryStore, WriteOp};
use chorely_firestore::{fields, Value};

/// Hands out `fresh-{uid}` for refresh token `refresh-{uid}`.
struct StubExchange;

#[async_trait]
impl TokenExchange for StubExchange {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, IdentityError> {
        let uid = refresh_token
            .strip_prefix("refresh-")
            .ok_or_else(|| IdentityError::Rejected {
                status: 400,
                message: "INVALID_REFRESH_TOKEN".into(),
            })?;
        Ok(RefreshedTokens {
            uid: uid.to_string(),
            id_token: format!("fresh-{uid}"),
            refresh_token: format!("refresh-{uid}"),
            expires_in_seconds: 3600,
        })
    }
}

struct TestContext {
    store: MemoryStore,
    exchange: StubExchange,
}

impl TestContext {
    async fn new() -> Self {
        let store = MemoryStore::new();
        store
            .insert("families/f1", fields! { "name" => "Parkers", "createdBy" => "parent" })
            .await;
        store
            .insert(
                "families/f1/members/parent",
                fields! {
                    "uid" => "parent", "name" => "Pat", "email" => "pat@example.com",
                    "role" => "admin", "status" => "active", "coins" => 0i64,
                },
            )
            .await;
        store
            .insert(
                "families/f1/members/kid",
                fields! {
                    "uid" => "kid", "name" => "Sam", "email" => "sam@example.com",
                    "role" => "player", "status" => "active", "coins" => 0i64,
                },
            )
            .await;
        store
            .insert(
                "families/f1/members/sibling",
                fields! {
                    "uid" => "sibling", "name" => "Alex", "email" => "alex@example.com",
                    "role" => "player", "status" => "active", "coins" => 0i64,
                },
            )
            .await;
        store
            .insert("users/parent", fields! { "role" => "parent", "familyIds" => vec!["f1".to_string()] })
            .await;

        Self {
            store,
            exchange: StubExchange,
        }
    }

    fn db(&self, uid: &str) -> Db<'_> {
        Db::new(
            &self.store,
            &self.exchange,
            FirebaseCredentials::new(uid, format!("token-{uid}"), format!("refresh-{uid}")),
        )
    }

    async fn set_coins(&self, member_id: &str, coins: i64) {
        let path = format!("families/f1/members/{member_id}");
        let mut fields = self.store.document(&path).await.unwrap().fields;
        fields.insert("coins".into(), Value::Integer(coins));
        self.store.insert(&path, fields).await;
    }

    async fn coins(&self, member_id: &str) -> i64 {
        self.store
            .document(&format!("families/f1/members/{member_id}"))
            .await
            .unwrap()
            .integer("coins")
    }
}

fn parent() -> Actor {
    Actor::new("parent").with_email("pat@example.com")
}

fn kid() -> Actor {
    Actor::new("kid").with_email("sam@example.com")
}

fn chore_request(descriptions: &[&str], coin_value: i64) -> CreateChoresRequest {
    CreateChoresRequest {
        family_id: "f1".into(),
        descriptions: descriptions.iter().map(|d| d.to_string()).collect(),
        assignee_id: Some("kid".into()),
        due_date: Some("2024-06-01".into()),
        coin_value: Some(coin_value),
    }
}

fn invite_request(email: &str) -> InviteRequest {
    InviteRequest {
        family_id: "f1".into(),
        email: email.into(),
        name: Some("Robin".into()),
        role: None,
    }
}

#[tokio::test]
async fn reinviting_legacy_member_migrates_exactly_once() {
    let ctx = TestContext::new().await;
    ctx.store
        .insert(
            "families/f1/members/Xk29dLq0",
            fields! {
                "name" => "Robin (old)", "email" => "robin@example.com",
                "role" => "player", "status" => "invited", "coins" => 3i64,
            },
        )
        .await;
    let mut db = ctx.db("parent");

    InviteService::new(&mut db)
        .invite(&parent(), invite_request("Robin@Example.com"))
        .await
        .unwrap();
    let second = InviteService::new(&mut db)
        .invite(&parent(), invite_request("robin@example.com"))
        .await
        .unwrap();

    assert_eq!(second.id, "email:robin@example.com");
    assert!(ctx.store.document("families/f1/members/Xk29dLq0").await.is_none());

    let keyed = ctx
        .store
        .document("families/f1/members/email:robin@example.com")
        .await
        .expect("email-keyed invite should exist");
    assert_eq!(keyed.string("name"), "Robin");
    assert_eq!(keyed.string("status"), "invited");
    assert_eq!(keyed.integer("coins"), 3);

    let deletes: Vec<_> = ctx
        .store
        .writes()
        .await
        .into_iter()
        .filter(|op| matches!(op, WriteOp::Delete(_)))
        .collect();
    assert_eq!(
        deletes,
        vec![WriteOp::Delete("families/f1/members/Xk29dLq0".into())]
    );

    let index = ctx
        .store
        .document("invitations/email:robin@example.com")
        .await
        .unwrap();
    assert_eq!(index.string_array("familyIds"), vec!["f1".to_string()]);
}

#[tokio::test]
async fn inviting_an_active_member_is_rejected() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("parent");

    let error = InviteService::new(&mut db)
        .invite(&parent(), invite_request("sam@example.com"))
        .await
        .unwrap_err();
    assert_eq!(error.code(), "already_member");
}

#[tokio::test]
async fn players_cannot_invite() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("kid");

    let error = InviteService::new(&mut db)
        .invite(&kid(), invite_request("robin@example.com"))
        .await
        .unwrap_err();
    assert_eq!(error.code(), "forbidden");
}

#[tokio::test]
async fn sign_in_claims_pending_invites() {
    let ctx = TestContext::new().await;
    {
        let mut db = ctx.db("parent");
        InviteService::new(&mut db)
            .invite(&parent(), invite_request("robin@example.com"))
            .await
            .unwrap();
    }

    let mut db = ctx.db("robin");
    let pending = InviteService::new(&mut db)
        .pending_for(&Actor::new("robin").with_email("robin@example.com"))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].family_name, "Parkers");

    let account = FirebaseAccount {
        uid: "robin".into(),
        email: Some("Robin@example.com".into()),
        email_verified: true,
        name: Some("Robin R".into()),
        picture: None,
    };
    let outcome = AccountService::new(&mut db).sign_in(&account, None).await.unwrap();

    assert_eq!(outcome.joined_family_ids, vec!["f1".to_string()]);
    assert_eq!(outcome.user.family_ids, vec!["f1".to_string()]);

    let member = ctx.store.document("families/f1/members/robin").await.unwrap();
    assert_eq!(member.string("status"), "active");
    assert_eq!(member.string("uid"), "robin");
    assert_eq!(member.string("name"), "Robin");
    assert!(ctx
        .store
        .document("families/f1/members/email:robin@example.com")
        .await
        .is_none());
    assert!(ctx
        .store
        .document("invitations/email:robin@example.com")
        .await
        .is_none());
}

#[tokio::test]
async fn claiming_an_invite_carries_over_assigned_chores() {
    let ctx = TestContext::new().await;
    let chore = {
        let mut db = ctx.db("parent");
        InviteService::new(&mut db)
            .invite(&parent(), invite_request("robin@example.com"))
            .await
            .unwrap();
        let mut request = chore_request(&["Water the plants"], 5);
        request.assignee_id = Some("email:robin@example.com".into());
        ChoreService::new(&mut db)
            .create(&parent(), request)
            .await
            .unwrap()
            .remove(0)
    };

    let robin = Actor::new("robin").with_email("robin@example.com");
    {
        let mut db = ctx.db("robin");
        InviteService::new(&mut db).claim(&robin, "f1").await.unwrap();

        let submitted = ChoreService::new(&mut db)
            .submit(&robin, "f1", &chore.id)
            .await
            .unwrap();
        assert_eq!(submitted.assignee_id.as_deref(), Some("robin"));
    }

    let mut db = ctx.db("parent");
    ChoreService::new(&mut db)
        .review(
            &parent(),
            &chore.id,
            ReviewChoreRequest {
                family_id: "f1".into(),
                decision: ReviewDecision::Approve,
                reason: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(ctx.coins("robin").await, 5);
}

#[tokio::test]
async fn migrating_a_legacy_invite_reassigns_its_chores() {
    let ctx = TestContext::new().await;
    ctx.store
        .insert(
            "families/f1/members/Xk29dLq0",
            fields! {
                "name" => "Robin (old)", "email" => "robin@example.com",
                "role" => "player", "status" => "invited",
            },
        )
        .await;
    ctx.store
        .insert(
            "families/f1/chores/c1",
            fields! {
                "title" => "Sweep", "status" => "open", "assigneeId" => "Xk29dLq0",
                "coinValue" => 2i64, "deleted" => false,
            },
        )
        .await;
    let mut db = ctx.db("parent");

    InviteService::new(&mut db)
        .invite(&parent(), invite_request("robin@example.com"))
        .await
        .unwrap();

    let chore = ctx.store.document("families/f1/chores/c1").await.unwrap();
    assert_eq!(chore.string("assigneeId"), "email:robin@example.com");
    assert_eq!(chore.string("title"), "Sweep");
}

#[tokio::test]
async fn unverified_email_does_not_join_invited_family() {
    let ctx = TestContext::new().await;
    {
        let mut db = ctx.db("parent");
        InviteService::new(&mut db)
            .invite(&parent(), invite_request("robin@example.com"))
            .await
            .unwrap();
    }

    let mut db = ctx.db("mallory");
    let account = FirebaseAccount {
        uid: "mallory".into(),
        email: Some("robin@example.com".into()),
        email_verified: false,
        name: None,
        picture: None,
    };
    let outcome = AccountService::new(&mut db).sign_in(&account, None).await.unwrap();
    assert!(outcome.joined_family_ids.is_empty());

    let mallory = Actor::new("mallory").with_unverified_email("robin@example.com");
    assert!(InviteService::new(&mut db)
        .pending_for(&mallory)
        .await
        .unwrap()
        .is_empty());
    let error = InviteService::new(&mut db)
        .claim(&mallory, "f1")
        .await
        .unwrap_err();
    assert_eq!(error.code(), "forbidden");

    assert!(ctx.store.document("families/f1/members/mallory").await.is_none());
    assert!(ctx
        .store
        .document("families/f1/members/email:robin@example.com")
        .await
        .is_some());
}

#[tokio::test]
async fn reinvite_without_role_keeps_pending_role() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("parent");
    let mut request = invite_request("robin@example.com");
    request.role = Some("admin".into());
    InviteService::new(&mut db).invite(&parent(), request).await.unwrap();

    let refreshed = InviteService::new(&mut db)
        .invite(&parent(), invite_request("robin@example.com"))
        .await
        .unwrap();

    assert_eq!(refreshed.role.as_str(), "admin");
    let keyed = ctx
        .store
        .document("families/f1/members/email:robin@example.com")
        .await
        .unwrap();
    assert_eq!(keyed.string("role"), "admin");
}

#[tokio::test]
async fn revoking_removes_pending_invite() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("parent");
    InviteService::new(&mut db)
        .invite(&parent(), invite_request("robin@example.com"))
        .await
        .unwrap();

    InviteService::new(&mut db)
        .revoke(&parent(), "f1", "robin@example.com")
        .await
        .unwrap();

    assert!(ctx
        .store
        .document("families/f1/members/email:robin@example.com")
        .await
        .is_none());
    let again = InviteService::new(&mut db)
        .revoke(&parent(), "f1", "robin@example.com")
        .await
        .unwrap_err();
    assert_eq!(again.code(), "not_found");
}

#[tokio::test]
async fn empty_description_list_is_rejected_without_writes() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("parent");

    let error = ChoreService::new(&mut db)
        .create(&parent(), chore_request(&["   ", ""], 5))
        .await
        .unwrap_err();

    assert!(matches!(error, ChoreError::DescriptionRequired));
    assert_eq!(error.code(), "description_required");
    assert!(ctx.store.writes().await.is_empty());
}

#[tokio::test]
async fn chore_payload_validation_codes() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("parent");

    let error = ChoreService::new(&mut db)
        .create(&parent(), chore_request(&["Dishes"], 10_001))
        .await
        .unwrap_err();
    assert_eq!(error.code(), "invalid_coin_value");

    let mut request = chore_request(&["Dishes"], 1);
    request.due_date = Some("06/01/2024".into());
    let error = ChoreService::new(&mut db)
        .create(&parent(), request)
        .await
        .unwrap_err();
    assert_eq!(error.code(), "invalid_due_date");

    let mut request = chore_request(&["Dishes"], 1);
    request.assignee_id = Some("nobody".into());
    let error = ChoreService::new(&mut db)
        .create(&parent(), request)
        .await
        .unwrap_err();
    assert_eq!(error.code(), "not_found");
}

#[tokio::test]
async fn approving_credits_assignee_exactly_once() {
    let ctx = TestContext::new().await;
    ctx.set_coins("kid", 4).await;

    let chore = {
        let mut db = ctx.db("parent");
        ChoreService::new(&mut db)
            .create(&parent(), chore_request(&["Feed the cat"], 7))
            .await
            .unwrap()
            .remove(0)
    };

    {
        let mut db = ctx.db("kid");
        let submitted = ChoreService::new(&mut db)
            .submit(&kid(), "f1", &chore.id)
            .await
            .unwrap();
        assert_eq!(submitted.status, ChoreStatus::Submitted);
    }

    let mut db = ctx.db("parent");
    let review = |decision| ReviewChoreRequest {
        family_id: "f1".into(),
        decision,
        reason: None,
    };
    let approved = ChoreService::new(&mut db)
        .review(&parent(), &chore.id, review(ReviewDecision::Approve))
        .await
        .unwrap();
    assert_eq!(approved.status, ChoreStatus::Approved);
    assert_eq!(ctx.coins("kid").await, 11);

    let error = ChoreService::new(&mut db)
        .review(&parent(), &chore.id, review(ReviewDecision::Approve))
        .await
        .unwrap_err();
    assert_eq!(error.code(), "invalid_transition");
    assert_eq!(ctx.coins("kid").await, 11);
}

#[tokio::test]
async fn rejected_chores_can_be_resubmitted() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("parent");
    let chore = ChoreService::new(&mut db)
        .create(&parent(), chore_request(&["Vacuum"], 2))
        .await
        .unwrap()
        .remove(0);

    let error = ChoreService::new(&mut db)
        .review(
            &parent(),
            &chore.id,
            ReviewChoreRequest {
                family_id: "f1".into(),
                decision: ReviewDecision::Reject,
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(error.code(), "invalid_transition");

    ChoreService::new(&mut db)
        .submit(&parent(), "f1", &chore.id)
        .await
        .unwrap();
    let rejected = ChoreService::new(&mut db)
        .review(
            &parent(),
            &chore.id,
            ReviewChoreRequest {
                family_id: "f1".into(),
                decision: ReviewDecision::Reject,
                reason: Some("  still dusty ".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.rejection_reason.as_deref(), Some("still dusty"));

    let resubmitted = ChoreService::new(&mut db)
        .submit(&parent(), "f1", &chore.id)
        .await
        .unwrap();
    assert_eq!(resubmitted.status, ChoreStatus::Submitted);
    assert_eq!(resubmitted.rejection_reason, None);
}

#[tokio::test]
async fn only_assignee_or_admin_may_submit() {
    let ctx = TestContext::new().await;
    let chore = {
        let mut db = ctx.db("parent");
        ChoreService::new(&mut db)
            .create(&parent(), chore_request(&["Dishes"], 1))
            .await
            .unwrap()
            .remove(0)
    };

    let mut db = ctx.db("sibling");
    let error = ChoreService::new(&mut db)
        .submit(&Actor::new("sibling"), "f1", &chore.id)
        .await
        .unwrap_err();
    assert_eq!(error.code(), "forbidden");
}

#[tokio::test]
async fn deleted_chores_disappear() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("parent");
    let chore = ChoreService::new(&mut db)
        .create(&parent(), chore_request(&["Dishes", "Laundry"], 1))
        .await
        .unwrap()
        .remove(0);

    ChoreService::new(&mut db)
        .delete(&parent(), "f1", &chore.id)
        .await
        .unwrap();

    let listed = ChoreService::new(&mut db)
        .list(
            &parent(),
            ListChoresQuery {
                family_id: "f1".into(),
                ..ListChoresQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_ne!(listed[0].id, chore.id);

    let error = ChoreService::new(&mut db)
        .submit(&parent(), "f1", &chore.id)
        .await
        .unwrap_err();
    assert_eq!(error.code(), "not_found");
}

#[tokio::test]
async fn suggestions_follow_usage_counts() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("parent");
    ChoreService::new(&mut db)
        .create(&parent(), chore_request(&["Dishes", "Laundry"], 1))
        .await
        .unwrap();
    ChoreService::new(&mut db)
        .create(&parent(), chore_request(&["dishes!"], 1))
        .await
        .unwrap();

    let suggestions = SuggestionService::new(&mut db)
        .suggest(&parent(), "f1", Some(1))
        .await
        .unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].count, 2);

    let counter = ctx.store.document("families/f1/choreUsage/dishes").await.unwrap();
    assert_eq!(counter.integer("count"), 2);
}

#[tokio::test]
async fn purchases_never_overdraw() {
    let ctx = TestContext::new().await;
    ctx.set_coins("kid", 25).await;
    let mut db = ctx.db("kid");
    let buy = |item: &str| PurchaseRequest {
        family_id: "f1".into(),
        item_id: item.into(),
    };

    let error = ShopService::new(&mut db)
        .purchase(&kid(), buy("avatar-robot"))
        .await
        .unwrap_err();
    assert_eq!(error.code(), "insufficient_coins");
    assert_eq!(ctx.coins("kid").await, 25);

    let outcome = ShopService::new(&mut db)
        .purchase(&kid(), buy("avatar-fox"))
        .await
        .unwrap();
    assert_eq!(outcome.member.coins, 5);
    assert_eq!(ctx.coins("kid").await, 5);

    let error = ShopService::new(&mut db)
        .purchase(&kid(), buy("avatar-fox"))
        .await
        .unwrap_err();
    assert_eq!(error.code(), "already_owned");

    let error = ShopService::new(&mut db)
        .purchase(&kid(), buy("badge-helper"))
        .await
        .unwrap_err();
    assert_eq!(error.code(), "insufficient_coins");
    assert_eq!(ctx.coins("kid").await, 5);

    let error = ShopService::new(&mut db)
        .purchase(&kid(), buy("unicorn"))
        .await
        .unwrap_err();
    assert_eq!(error.code(), "not_found");
}

#[tokio::test]
async fn admins_cannot_remove_themselves_or_the_last_admin() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("parent");

    let error = MemberService::new(&mut db)
        .remove(&parent(), "f1", "parent")
        .await
        .unwrap_err();
    assert_eq!(error.code(), "cannot_remove_self");

    let error = MemberService::new(&mut db)
        .update(
            &parent(),
            "parent",
            chorely_chores::types::UpdateMemberRequest {
                family_id: "f1".into(),
                name: None,
                role: Some("player".into()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(error.code(), "last_admin");

    MemberService::new(&mut db)
        .remove(&parent(), "f1", "sibling")
        .await
        .unwrap();
    assert!(ctx.store.document("families/f1/members/sibling").await.is_none());
}

#[tokio::test]
async fn expired_token_is_refreshed_once_and_reported() {
    let ctx = TestContext::new().await;
    ctx.store.reject_token("token-parent").await;
    let mut db = ctx.db("parent");

    let chores = ChoreService::new(&mut db)
        .list(
            &parent(),
            ListChoresQuery {
                family_id: "f1".into(),
                ..ListChoresQuery::default()
            },
        )
        .await
        .unwrap();
    assert!(chores.is_empty());

    assert!(db.credentials().was_refreshed());
    assert_eq!(db.credentials().id_token, "fresh-parent");
    let seen = ctx.store.tokens_seen().await;
    assert_eq!(seen.iter().filter(|token| *token == "token-parent").count(), 1);
}

#[tokio::test]
async fn non_members_are_forbidden() {
    let ctx = TestContext::new().await;
    let mut db = ctx.db("stranger");

    let error = ChoreService::new(&mut db)
        .list(
            &Actor::new("stranger"),
            ListChoresQuery {
                family_id: "f1".into(),
                ..ListChoresQuery::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(error.code(), "forbidden");
}
