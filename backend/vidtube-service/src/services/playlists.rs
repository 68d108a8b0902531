/// Playlist service
///
/// A playlist holds each video at most once, in the order it was first added.
use std::sync::Arc;
use uuid::Uuid;

use super::{optional_text, require_text, EngagementService};
use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::ensure_owner;
use crate::models::Playlist;

pub struct PlaylistService {
    store: Arc<dyn EntityStore>,
}

impl PlaylistService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    fn not_found() -> AppError {
        AppError::NotFound("Playlist not found".to_string())
    }

    pub async fn get_playlist(&self, playlist_id: Uuid) -> Result<Playlist> {
        self.store
            .find_playlist(playlist_id)
            .await?
            .ok_or_else(Self::not_found)
    }

    pub async fn create_playlist(
        &self,
        user_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Playlist> {
        let name = require_text(name, "name")?;
        let description = require_text(description, "description")?;
        if self.store.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let playlist = self
            .store
            .insert_playlist(user_id, &name, &description)
            .await?;

        metrics::record_mutation("playlist", "create");
        tracing::info!(playlist_id = %playlist.id, user_id = %user_id, "playlist created");
        Ok(playlist)
    }

    pub async fn get_user_playlists(&self, user_id: Uuid) -> Result<Vec<Playlist>> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        self.store.list_owner_playlists(user_id).await
    }

    pub async fn update_playlist(
        &self,
        playlist_id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Playlist> {
        let name = optional_text(name, "name")?;
        let description = optional_text(description, "description")?;
        if name.is_none() && description.is_none() {
            return Err(AppError::InvalidArgument(
                "name or description is required".to_string(),
            ));
        }

        let playlist = self.get_playlist(playlist_id).await?;
        ensure_owner(&playlist, user_id, "update")?;

        let updated = self
            .store
            .update_playlist(playlist_id, name.as_deref(), description.as_deref())
            .await?
            .ok_or_else(Self::not_found)?;

        metrics::record_mutation("playlist", "update");
        tracing::info!(playlist_id = %playlist_id, user_id = %user_id, "playlist updated");
        Ok(updated)
    }

    pub async fn delete_playlist(&self, playlist_id: Uuid, user_id: Uuid) -> Result<Playlist> {
        let playlist = self.get_playlist(playlist_id).await?;
        ensure_owner(&playlist, user_id, "delete")?;

        if !self.store.delete_playlist(playlist_id).await? {
            return Err(Self::not_found());
        }

        metrics::record_mutation("playlist", "delete");
        tracing::info!(playlist_id = %playlist_id, user_id = %user_id, "playlist deleted");
        Ok(playlist)
    }

    /// Add a video; adding one that is already present changes nothing
    pub async fn add_video(
        &self,
        playlist_id: Uuid,
        video_id: Uuid,
        user_id: Uuid,
    ) -> Result<Playlist> {
        let playlist = self.get_playlist(playlist_id).await?;
        ensure_owner(&playlist, user_id, "update")?;
        EngagementService::new(self.store.clone())
            .visible_video(video_id, user_id)
            .await?;

        let updated = self
            .store
            .add_playlist_video(playlist_id, video_id)
            .await?
            .ok_or_else(Self::not_found)?;

        metrics::record_mutation("playlist", "add_video");
        tracing::info!(playlist_id = %playlist_id, video_id = %video_id, "video added to playlist");
        Ok(updated)
    }

    pub async fn remove_video(
        &self,
        playlist_id: Uuid,
        video_id: Uuid,
        user_id: Uuid,
    ) -> Result<Playlist> {
        let playlist = self.get_playlist(playlist_id).await?;
        ensure_owner(&playlist, user_id, "update")?;
        if !playlist.videos.contains(&video_id) {
            return Err(AppError::NotFound(
                "Video is not in this playlist".to_string(),
            ));
        }

        let updated = self
            .store
            .remove_playlist_video(playlist_id, video_id)
            .await?
            .ok_or_else(Self::not_found)?;

        metrics::record_mutation("playlist", "remove_video");
        tracing::info!(playlist_id = %playlist_id, video_id = %video_id, "video removed from playlist");
        Ok(updated)
    }
}
