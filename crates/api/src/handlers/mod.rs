//! HTTP request handlers, grouped by resource.

pub mod auth;
pub mod channel_auth;
pub mod friendship;
pub mod meeting;
pub mod note;
pub mod presence;

use confab_core::error::CoreError;
use confab_core::types::DbId;
use confab_db::repositories::UserRepo;
use confab_db::DbPool;
use confab_events::Actor;

use crate::error::{AppError, AppResult};

/// Resolve a user's display metadata for event attribution.
pub(crate) async fn actor_for(pool: &DbPool, user_id: DbId) -> AppResult<Actor> {
    let profile = UserRepo::profile(pool, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })
        })?;
    Ok(Actor {
        user_id: profile.id,
        display_name: profile.display_name,
        avatar_url: profile.avatar_url,
    })
}
