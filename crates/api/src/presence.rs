//! Presence query service: staleness-adjusted reads over the presence store.
//!
//! Writes go straight to [`PresenceRepo`]; this module owns the read
//! policy. A stored record whose `last_seen_at` has fallen outside the
//! configured staleness window is reported as `offline` without mutating
//! the row, and users with no record at all are reported as `offline`
//! rather than omitted.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use confab_core::presence::{effective_status, PresenceStatus};
use confab_core::types::DbId;
use confab_db::models::presence::{FriendPresence, PresenceRecord, PresenceView};
use confab_db::repositories::{FriendshipRepo, PresenceRepo, UserRepo};
use confab_db::DbPool;

/// Read-side presence queries with the staleness window applied.
pub struct PresenceService;

impl PresenceService {
    /// Fetch the caller's own stored record, provisioning a default
    /// `online` one on first read.
    pub async fn get_own(pool: &DbPool, user_id: DbId) -> Result<PresenceRecord, sqlx::Error> {
        PresenceRepo::get_or_create(pool, user_id).await
    }

    /// Staleness-adjusted presence for a set of users.
    ///
    /// One entry per requested id, in request order. Users with no stored
    /// record appear as `offline` with no `last_seen_at`.
    pub async fn views_for_users(
        pool: &DbPool,
        user_ids: &[DbId],
        staleness_window_secs: i64,
    ) -> Result<Vec<PresenceView>, sqlx::Error> {
        let records = PresenceRepo::get_for_users(pool, user_ids).await?;
        let by_user: HashMap<DbId, PresenceRecord> =
            records.into_iter().map(|r| (r.user_id, r)).collect();

        let now = Utc::now();
        Ok(user_ids
            .iter()
            .map(|&user_id| match by_user.get(&user_id) {
                Some(record) => view_of(record, staleness_window_secs, now),
                None => PresenceView::absent(user_id),
            })
            .collect())
    }

    /// The subset of `user_ids` whose effective status is `online`.
    pub async fn online_user_ids(
        pool: &DbPool,
        user_ids: &[DbId],
        staleness_window_secs: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let views = Self::views_for_users(pool, user_ids, staleness_window_secs).await?;
        Ok(views
            .into_iter()
            .filter(|v| v.status == PresenceStatus::Online)
            .map(|v| v.user_id)
            .collect())
    }

    /// The caller's accepted friends joined with profile and presence.
    ///
    /// The friend list itself must resolve; a failed profile or presence
    /// batch lookup degrades those fields to nulls/offline instead of
    /// failing the whole call.
    pub async fn friends_with_presence(
        pool: &DbPool,
        user_id: DbId,
        staleness_window_secs: i64,
    ) -> Result<Vec<FriendPresence>, sqlx::Error> {
        let friend_ids = FriendshipRepo::accepted_friend_ids(pool, user_id).await?;
        if friend_ids.is_empty() {
            return Ok(vec![]);
        }

        let profiles: HashMap<DbId, (String, Option<String>)> =
            match UserRepo::profiles_for(pool, &friend_ids).await {
                Ok(list) => list
                    .into_iter()
                    .map(|p| (p.id, (p.display_name, p.avatar_url)))
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "Profile lookup failed, degrading friend list");
                    HashMap::new()
                }
            };

        let views: HashMap<DbId, PresenceView> =
            match Self::views_for_users(pool, &friend_ids, staleness_window_secs).await {
                Ok(list) => list.into_iter().map(|v| (v.user_id, v)).collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "Presence lookup failed, degrading friend list");
                    HashMap::new()
                }
            };

        Ok(friend_ids
            .into_iter()
            .map(|friend_id| {
                let (display_name, avatar_url) = profiles
                    .get(&friend_id)
                    .map(|(name, avatar)| (Some(name.clone()), avatar.clone()))
                    .unwrap_or((None, None));
                let (status, last_seen_at, current_meeting_id) = views
                    .get(&friend_id)
                    .map(|v| (v.status, v.last_seen_at, v.current_meeting_id))
                    .unwrap_or((PresenceStatus::Offline, None, None));
                FriendPresence {
                    friend_id,
                    display_name,
                    avatar_url,
                    status,
                    last_seen_at,
                    current_meeting_id,
                }
            })
            .collect())
    }
}

fn view_of(
    record: &PresenceRecord,
    staleness_window_secs: i64,
    now: confab_core::types::Timestamp,
) -> PresenceView {
    let stored = PresenceStatus::parse(&record.status).unwrap_or(PresenceStatus::Offline);
    PresenceView {
        user_id: record.user_id,
        status: effective_status(stored, record.last_seen_at, now, staleness_window_secs),
        last_seen_at: Some(record.last_seen_at),
        current_meeting_id: record.current_meeting_id,
    }
}

/// Presence lookup seam for the notification router.
///
/// The router only ever needs "which of these users are online"; keeping
/// that behind a trait lets tests stub presence without a database.
#[async_trait]
pub trait PresenceLookup: Send + Sync {
    /// The subset of `user_ids` currently considered online.
    async fn online_user_ids(&self, user_ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error>;
}

/// Database-backed [`PresenceLookup`] using the configured staleness window.
pub struct DbPresenceLookup {
    pool: DbPool,
    staleness_window_secs: i64,
}

impl DbPresenceLookup {
    pub fn new(pool: DbPool, staleness_window_secs: i64) -> Self {
        Self {
            pool,
            staleness_window_secs,
        }
    }
}

#[async_trait]
impl PresenceLookup for DbPresenceLookup {
    async fn online_user_ids(&self, user_ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        PresenceService::online_user_ids(&self.pool, user_ids, self.staleness_window_secs).await
    }
}
