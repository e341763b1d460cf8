//! Shop service for spending coins on cosmetics.

use chorely_firestore::fields;
use chrono::Utc;
use tracing::info;

use crate::db::Db;
use crate::entities::cosmetic;
use crate::entities::CosmeticItem;
use crate::services::MemberService;
use crate::types::{Actor, ChoreError, ChoreResult, PurchaseOutcome, PurchaseRequest};
use crate::utils::paths;

/// Service for the cosmetics shop
pub struct ShopService<'s, 'a> {
    db: &'s mut Db<'a>,
}

impl<'s, 'a> ShopService<'s, 'a> {
    pub fn new(db: &'s mut Db<'a>) -> Self {
        Self { db }
    }

    pub fn catalog() -> &'static [CosmeticItem] {
        cosmetic::catalog()
    }

    /// Buys an item for the caller. The balance never goes below zero.
    pub async fn purchase(&mut self, actor: &Actor, request: PurchaseRequest) -> ChoreResult<PurchaseOutcome> {
        let item = cosmetic::find(&request.item_id).ok_or_else(|| ChoreError::not_found("item"))?;
        let family_id = request.family_id.as_str();

        let mut member = MemberService::new(self.db)
            .require_member(family_id, &actor.uid)
            .await?;
        if member.owns(&item.id) {
            return Err(ChoreError::AlreadyOwned);
        }
        if member.coins < item.price {
            return Err(ChoreError::InsufficientCoins {
                balance: member.coins,
                price: item.price,
            });
        }

        member.coins -= item.price;
        member.cosmetics.push(item.id.clone());
        member.updated_at = Some(Utc::now());

        self.db
            .set(
                &paths::member(family_id, &member.id),
                fields! {
                    "coins" => member.coins,
                    "cosmetics" => member.cosmetics.clone(),
                    "updatedAt" => member.updated_at,
                },
                Some(&["coins", "cosmetics", "updatedAt"][..]),
            )
            .await?;

        info!(family = family_id, uid = %actor.uid, item = %item.id, balance = member.coins, "purchased cosmetic");
        Ok(PurchaseOutcome {
            item: item.clone(),
            member,
        })
    }
}
