/// Profile service - mirrors identity-provider profiles into the store
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::require_text;
use crate::db::EntityStore;
use crate::error::Result;
use crate::metrics;
use crate::models::{User, UserSummary};

pub struct ProfileService {
    store: Arc<dyn EntityStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Create or refresh the acting user's channel profile
    pub async fn sync_profile(
        &self,
        user_id: Uuid,
        username: &str,
        fullname: &str,
        avatar: Option<&str>,
    ) -> Result<UserSummary> {
        let user = User {
            id: user_id,
            username: require_text(username, "username")?.to_lowercase(),
            fullname: require_text(fullname, "fullname")?,
            avatar: avatar.map(str::trim).unwrap_or_default().to_string(),
            created_at: Utc::now(),
        };

        let stored = self.store.upsert_user(&user).await?;

        metrics::record_mutation("user", "sync");
        tracing::info!(user_id = %user_id, username = %stored.username, "profile synced");
        Ok(UserSummary::from(&stored))
    }
}
