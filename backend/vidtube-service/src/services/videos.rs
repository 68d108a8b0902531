/// Video service - publishing, discovery and owner edits
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{optional_text, require_text, MediaGateway};
use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::ensure_owner;
use crate::models::{
    NewVideo, UserSummary, Video, VideoChanges, VideoDetails, VideoPage, VideoPagination,
    VideoQuery,
};

/// A new video whose files are staged on local disk
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub title: String,
    pub description: String,
    pub video_file: PathBuf,
    pub thumbnail: PathBuf,
}

/// Trimmed text fields, bounded by the `videos` columns
#[derive(Debug, Validate)]
struct VideoText {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    title: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    description: Option<String>,
}

pub struct VideoService {
    store: Arc<dyn EntityStore>,
    media: Arc<dyn MediaGateway>,
}

impl VideoService {
    pub fn new(store: Arc<dyn EntityStore>, media: Arc<dyn MediaGateway>) -> Self {
        Self { store, media }
    }

    async fn load(&self, video_id: Uuid) -> Result<Video> {
        self.store
            .find_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    /// Search, sort and paginate the catalogue
    pub async fn list_videos(&self, query: VideoQuery) -> Result<VideoPage> {
        if let Some(owner) = query.owner {
            if self.store.find_user(owner).await?.is_none() {
                return Err(AppError::NotFound("User not found".to_string()));
            }
        }

        let (videos, total) = self.store.list_videos(&query).await?;

        Ok(VideoPage {
            videos,
            pagination: VideoPagination {
                total_videos: total,
                total_pages: query.page.total_pages(total),
                current_page: query.page.page,
                limit: query.page.limit,
            },
        })
    }

    /// Video with its owner's profile; drafts resolve only for the owner
    pub async fn get_video(&self, video_id: Uuid, viewer: Uuid) -> Result<VideoDetails> {
        let video = self.load(video_id).await?;
        if !video.visible_to(viewer) {
            return Err(AppError::NotFound("Video not found".to_string()));
        }

        let owner = self
            .store
            .find_user(video.owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Video owner not found".to_string()))?;

        Ok(VideoDetails {
            owner_details: UserSummary::from(&owner),
            video,
        })
    }

    /// Upload both files, then persist the video as a draft.
    ///
    /// Nothing is stored unless both uploads succeed.
    pub async fn publish_video(&self, upload: VideoUpload, owner_id: Uuid) -> Result<Video> {
        let title = require_text(&upload.title, "title")?;
        let description = require_text(&upload.description, "description")?;
        VideoText {
            title: Some(title.clone()),
            description: Some(description.clone()),
        }
        .validate()?;
        if self.store.find_user(owner_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let media = self.media.upload(&upload.video_file).await.map_err(|e| {
            tracing::error!(user_id = %owner_id, error = %e, "video file upload failed");
            AppError::UploadFailed("Error while uploading video file".to_string())
        })?;

        let thumbnail = self.media.upload(&upload.thumbnail).await.map_err(|e| {
            // The video file already on the media host is left in place
            tracing::warn!(
                user_id = %owner_id,
                orphaned_url = %media.url,
                error = %e,
                "thumbnail upload failed after video upload succeeded"
            );
            AppError::UploadFailed("Error while uploading thumbnail".to_string())
        })?;

        let video = self
            .store
            .insert_video(NewVideo {
                owner_id,
                title,
                description,
                video_url: media.url,
                thumbnail_url: thumbnail.url,
                duration: media.duration.unwrap_or(0.0),
            })
            .await?;

        metrics::record_mutation("video", "create");
        tracing::info!(video_id = %video.id, user_id = %owner_id, "video published as draft");
        Ok(video)
    }

    /// Owner edit of title, description and/or thumbnail
    pub async fn update_video(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        thumbnail: Option<PathBuf>,
    ) -> Result<Video> {
        let mut changes = VideoChanges {
            title: optional_text(title, "title")?,
            description: optional_text(description, "description")?,
            thumbnail_url: None,
        };
        if changes.is_empty() && thumbnail.is_none() {
            return Err(AppError::InvalidArgument(
                "title, description or thumbnail is required".to_string(),
            ));
        }
        VideoText {
            title: changes.title.clone(),
            description: changes.description.clone(),
        }
        .validate()?;

        let video = self.load(video_id).await?;
        ensure_owner(&video, user_id, "update")?;

        if let Some(path) = thumbnail {
            let uploaded = self.media.upload(&path).await.map_err(|e| {
                tracing::error!(video_id = %video_id, error = %e, "thumbnail upload failed");
                AppError::UploadFailed("Error while uploading thumbnail".to_string())
            })?;
            changes.thumbnail_url = Some(uploaded.url);
        }

        let updated = self
            .store
            .update_video(video_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        metrics::record_mutation("video", "update");
        tracing::info!(video_id = %video_id, user_id = %user_id, "video updated");
        Ok(updated)
    }

    /// Delete a video with its comments, likes and playlist entries
    pub async fn delete_video(&self, video_id: Uuid, user_id: Uuid) -> Result<Video> {
        let video = self.load(video_id).await?;
        ensure_owner(&video, user_id, "delete")?;

        if !self.store.delete_video_cascade(video_id).await? {
            return Err(AppError::NotFound("Video not found".to_string()));
        }

        metrics::record_mutation("video", "delete");
        tracing::info!(video_id = %video_id, user_id = %user_id, "video deleted");
        Ok(video)
    }

    /// Flip Draft <-> Published
    pub async fn toggle_publish_status(&self, video_id: Uuid, user_id: Uuid) -> Result<Video> {
        let video = self.load(video_id).await?;
        ensure_owner(&video, user_id, "update")?;

        let updated = self
            .store
            .set_video_published(video_id, !video.is_published)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        metrics::record_mutation("video", "toggle_publish");
        tracing::info!(
            video_id = %video_id,
            user_id = %user_id,
            is_published = updated.is_published,
            "video publish status toggled"
        );
        Ok(updated)
    }
}
