/// Post service - community posts ("tweets")
use std::sync::Arc;
use uuid::Uuid;

use super::require_text;
use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::ensure_owner;
use crate::models::Post;

pub struct PostService {
    store: Arc<dyn EntityStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tweet not found".to_string()))
    }

    pub async fn create_post(&self, user_id: Uuid, content: &str) -> Result<Post> {
        let content = require_text(content, "content")?;
        if self.store.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let post = self.store.insert_post(user_id, &content).await?;

        metrics::record_mutation("tweet", "create");
        tracing::info!(post_id = %post.id, user_id = %user_id, "tweet created");
        Ok(post)
    }

    /// Posts by a user, newest first
    pub async fn get_user_posts(&self, user_id: Uuid) -> Result<Vec<Post>> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        self.store.list_owner_posts(user_id).await
    }

    pub async fn update_post(&self, post_id: Uuid, user_id: Uuid, content: &str) -> Result<Post> {
        let content = require_text(content, "content")?;
        let post = self.get_post(post_id).await?;
        ensure_owner(&post, user_id, "update")?;

        let updated = self
            .store
            .update_post(post_id, &content)
            .await?
            .ok_or_else(|| AppError::NotFound("Tweet not found".to_string()))?;

        metrics::record_mutation("tweet", "update");
        tracing::info!(post_id = %post_id, user_id = %user_id, "tweet updated");
        Ok(updated)
    }

    /// Delete a post together with its likes
    pub async fn delete_post(&self, post_id: Uuid, user_id: Uuid) -> Result<Post> {
        let post = self.get_post(post_id).await?;
        ensure_owner(&post, user_id, "delete")?;

        if !self.store.delete_post_cascade(post_id).await? {
            return Err(AppError::NotFound("Tweet not found".to_string()));
        }

        metrics::record_mutation("tweet", "delete");
        tracing::info!(post_id = %post_id, user_id = %user_id, "tweet deleted");
        Ok(post)
    }
}
