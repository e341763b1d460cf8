//! Suggestion service backed by per-family chore usage counters.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::db::Db;
use crate::entities::{ChoreSuggestion, ChoreUsage};
use crate::services::MemberService;
use crate::types::{Actor, ChoreResult};
use crate::utils::{paths, Validator};

pub const DEFAULT_SUGGESTION_LIMIT: u32 = 8;
pub const MAX_SUGGESTION_LIMIT: u32 = 50;

/// Service for chore title suggestions
pub struct SuggestionService<'s, 'a> {
    db: &'s mut Db<'a>,
}

impl<'s, 'a> SuggestionService<'s, 'a> {
    pub fn new(db: &'s mut Db<'a>) -> Self {
        Self { db }
    }

    /// Most used titles, by count then recency.
    pub async fn suggest(
        &mut self,
        actor: &Actor,
        family_id: &str,
        limit: Option<u32>,
    ) -> ChoreResult<Vec<ChoreSuggestion>> {
        let limit = limit
            .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
            .clamp(1, MAX_SUGGESTION_LIMIT) as usize;

        MemberService::new(self.db)
            .require_member(family_id, &actor.uid)
            .await?;

        let mut usage: Vec<ChoreUsage> = self
            .db
            .list(&paths::usage(family_id))
            .await?
            .iter()
            .map(ChoreUsage::from_document)
            .filter(|usage| !usage.title.is_empty())
            .collect();

        usage.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.last_used_at.cmp(&a.last_used_at))
                .then_with(|| a.title.cmp(&b.title))
        });

        Ok(usage
            .into_iter()
            .take(limit)
            .map(|usage| ChoreSuggestion {
                title: usage.title,
                count: usage.count,
            })
            .collect())
    }

    /// Bumps the usage counter of every title. Read-modify-write per slug.
    pub async fn record_usage(&mut self, family_id: &str, titles: &[String]) -> ChoreResult<()> {
        let mut bumps: BTreeMap<String, (String, i64)> = BTreeMap::new();
        for title in titles {
            let entry = bumps
                .entry(Validator::slug(title))
                .or_insert_with(|| (title.clone(), 0));
            entry.1 += 1;
        }

        let now = Utc::now();
        for (slug, (title, increment)) in bumps {
            let path = paths::usage_counter(family_id, &slug);
            let previous = self
                .db
                .get(&path)
                .await?
                .map(|document| ChoreUsage::from_document(&document).count)
                .unwrap_or(0);

            let usage = ChoreUsage {
                slug,
                title,
                count: previous + increment,
                last_used_at: Some(now),
            };
            self.db.set(&path, usage.to_fields(), None).await?;
        }
        Ok(())
    }
}
