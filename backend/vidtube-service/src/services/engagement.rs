//! Engagement aggregator
//!
//! Answers derived questions over likes and subscriptions (channel stats,
//! liked videos, subscriber lists, comment pages) without keeping
//! denormalised counters, and performs the engagement toggles.

use std::sync::Arc;
use uuid::Uuid;

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{
    ChannelStats, Comment, EngagementKind, LikeTarget, LikedVideo, Page, ToggleOutcome,
    UserSummary, Video,
};

#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn EntityStore>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn require_user(&self, id: Uuid, label: &str) -> Result<()> {
        match self.store.find_user(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("{} not found", label))),
        }
    }

    /// Video that `viewer` is allowed to see
    pub(crate) async fn visible_video(&self, video_id: Uuid, viewer: Uuid) -> Result<Video> {
        self.store
            .find_video(video_id)
            .await?
            .filter(|video| video.visible_to(viewer))
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    /// Subscriber/video/like totals for a channel as seen by `viewer`.
    ///
    /// Video and like totals cover drafts too; only `is_subscribed` depends
    /// on the viewer.
    pub async fn channel_stats(&self, channel_id: Uuid, viewer: Uuid) -> Result<ChannelStats> {
        self.require_user(channel_id, "Channel").await?;

        let (
            subscriber_count,
            subscribed_to_count,
            is_subscribed,
            total_video_count,
            total_likes_across_videos,
        ) = tokio::try_join!(
            self.store.count_subscribers(channel_id),
            self.store.count_subscriptions(channel_id),
            self.store.is_subscribed(viewer, channel_id),
            self.store.count_owner_videos(channel_id),
            self.store.count_owner_video_likes(channel_id),
        )?;

        Ok(ChannelStats {
            subscriber_count,
            subscribed_to_count,
            is_subscribed,
            total_video_count,
            total_likes_across_videos,
        })
    }

    /// Flip the engagement relation between `actor` and `target_id`
    pub async fn toggle_engagement(
        &self,
        kind: EngagementKind,
        actor: Uuid,
        target_id: Uuid,
    ) -> Result<ToggleOutcome> {
        let result = self.toggle_inner(kind, actor, target_id).await;

        let outcome = match &result {
            Ok(ToggleOutcome { active: true, .. }) => "activated",
            Ok(ToggleOutcome { active: false, .. }) => "deactivated",
            Err(_) => "rejected",
        };
        metrics::record_toggle(kind.as_str(), outcome);

        if let Ok(toggle) = &result {
            tracing::info!(
                kind = kind.as_str(),
                user_id = %actor,
                target_id = %target_id,
                active = toggle.active,
                count = toggle.count,
                "engagement toggled"
            );
        }

        result
    }

    async fn toggle_inner(
        &self,
        kind: EngagementKind,
        actor: Uuid,
        target_id: Uuid,
    ) -> Result<ToggleOutcome> {
        self.require_user(actor, "User").await?;

        let target = match kind {
            EngagementKind::Subscription => return self.toggle_subscription(actor, target_id).await,
            EngagementKind::VideoLike => {
                self.visible_video(target_id, actor).await?;
                LikeTarget::Video(target_id)
            }
            EngagementKind::CommentLike => {
                let comment = self
                    .store
                    .find_comment(target_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
                self.visible_video(comment.video_id, actor).await?;
                LikeTarget::Comment(target_id)
            }
            EngagementKind::TweetLike => {
                self.store
                    .find_post(target_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Tweet not found".to_string()))?;
                LikeTarget::Post(target_id)
            }
        };

        let active = self.store.toggle_like(actor, target).await?;
        let count = self.store.count_likes(target).await?;
        Ok(ToggleOutcome { active, count })
    }

    async fn toggle_subscription(&self, subscriber: Uuid, channel: Uuid) -> Result<ToggleOutcome> {
        if subscriber == channel {
            return Err(AppError::InvalidArgument(
                "You cannot subscribe to your own channel".to_string(),
            ));
        }
        self.require_user(channel, "Channel").await?;

        let active = self.store.toggle_subscription(subscriber, channel).await?;
        let count = self.store.count_subscribers(channel).await?;
        Ok(ToggleOutcome { active, count })
    }

    /// Videos `user_id` has liked; comment and tweet likes never appear
    pub async fn list_liked_videos(&self, user_id: Uuid) -> Result<Vec<LikedVideo>> {
        self.store.list_liked_videos(user_id).await
    }

    /// One page of a video's comments, oldest first
    pub async fn list_comments(
        &self,
        video_id: Uuid,
        viewer: Uuid,
        page: Page,
    ) -> Result<Vec<Comment>> {
        self.visible_video(video_id, viewer).await?;
        self.store
            .list_video_comments(video_id, page.offset(), page.limit as i64)
            .await
    }

    pub async fn list_subscribers(&self, channel_id: Uuid) -> Result<Vec<UserSummary>> {
        self.require_user(channel_id, "Channel").await?;
        self.store.list_subscribers(channel_id).await
    }

    pub async fn list_subscribed_channels(&self, subscriber_id: Uuid) -> Result<Vec<UserSummary>> {
        self.require_user(subscriber_id, "User").await?;
        self.store.list_subscribed_channels(subscriber_id).await
    }

    /// Videos of a channel; drafts are included only for the channel itself
    pub async fn list_channel_videos(&self, channel_id: Uuid, viewer: Uuid) -> Result<Vec<Video>> {
        self.require_user(channel_id, "Channel").await?;
        self.store
            .list_owner_videos(channel_id, channel_id == viewer)
            .await
    }
}
