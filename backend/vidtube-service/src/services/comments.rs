/// Comment service - creation, editing and removal of video comments
use std::sync::Arc;
use uuid::Uuid;

use super::{require_text, EngagementService};
use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::ensure_owner;
use crate::models::Comment;

pub struct CommentService {
    store: Arc<dyn EntityStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn load(&self, comment_id: Uuid) -> Result<Comment> {
        self.store
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    /// Add a comment to a video the author can see
    pub async fn create_comment(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        let content = require_text(content, "content")?;
        let engagement = EngagementService::new(self.store.clone());
        engagement.require_user(user_id, "User").await?;
        engagement.visible_video(video_id, user_id).await?;

        let comment = self
            .store
            .insert_comment(video_id, user_id, &content)
            .await?;

        metrics::record_mutation("comment", "create");
        tracing::info!(comment_id = %comment.id, video_id = %video_id, user_id = %user_id, "comment created");
        Ok(comment)
    }

    pub async fn update_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        let content = require_text(content, "content")?;
        let comment = self.load(comment_id).await?;
        ensure_owner(&comment, user_id, "update")?;

        let updated = self
            .store
            .update_comment(comment_id, &content)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        metrics::record_mutation("comment", "update");
        tracing::info!(comment_id = %comment_id, user_id = %user_id, "comment updated");
        Ok(updated)
    }

    /// Delete a comment together with its likes
    pub async fn delete_comment(&self, comment_id: Uuid, user_id: Uuid) -> Result<Comment> {
        let comment = self.load(comment_id).await?;
        ensure_owner(&comment, user_id, "delete")?;

        if !self.store.delete_comment_cascade(comment_id).await? {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        metrics::record_mutation("comment", "delete");
        tracing::info!(comment_id = %comment_id, user_id = %user_id, "comment deleted");
        Ok(comment)
    }
}
