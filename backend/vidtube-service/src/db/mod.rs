//! Entity store access layer
//!
//! `EntityStore` is the seam between services and persistence. `PgStore` backs
//! production; `InMemoryStore` gives tests and local development the same
//! semantics without a database.

pub mod memory_store;
pub mod pg_store;

pub use memory_store::InMemoryStore;
pub use pg_store::PgStore;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Comment, LikeTarget, LikedVideo, NewVideo, Playlist, Post, User, UserSummary, Video,
    VideoChanges, VideoQuery,
};

/// Persistence operations used by the services.
///
/// Toggles are single atomic operations: implementations never check for an
/// existing record and then write in a separate step.
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Round-trip used by readiness probes
    async fn ping(&self) -> Result<()>;

    // ---- users -------------------------------------------------------

    /// Insert or refresh a user profile
    async fn upsert_user(&self, user: &User) -> Result<User>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    // ---- videos ------------------------------------------------------

    async fn insert_video(&self, video: NewVideo) -> Result<Video>;

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>>;

    async fn update_video(&self, id: Uuid, changes: &VideoChanges) -> Result<Option<Video>>;

    async fn set_video_published(&self, id: Uuid, published: bool) -> Result<Option<Video>>;

    /// Delete a video with its comments, likes on both, and playlist entries.
    /// Returns false when the video did not exist.
    async fn delete_video_cascade(&self, id: Uuid) -> Result<bool>;

    /// Page of videos matching the query plus the total match count
    async fn list_videos(&self, query: &VideoQuery) -> Result<(Vec<Video>, i64)>;

    /// All videos of one owner, newest first
    async fn list_owner_videos(&self, owner: Uuid, include_drafts: bool) -> Result<Vec<Video>>;

    // ---- comments ----------------------------------------------------

    async fn insert_comment(&self, video_id: Uuid, owner_id: Uuid, content: &str)
        -> Result<Comment>;

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>>;

    async fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<Comment>>;

    /// Delete a comment and the likes on it
    async fn delete_comment_cascade(&self, id: Uuid) -> Result<bool>;

    /// Comments of a video oldest first, `(created_at, id)` breaking ties
    async fn list_video_comments(&self, video_id: Uuid, offset: i64, limit: i64)
        -> Result<Vec<Comment>>;

    // ---- posts -------------------------------------------------------

    async fn insert_post(&self, owner_id: Uuid, content: &str) -> Result<Post>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;

    async fn update_post(&self, id: Uuid, content: &str) -> Result<Option<Post>>;

    /// Delete a post and the likes on it
    async fn delete_post_cascade(&self, id: Uuid) -> Result<bool>;

    async fn list_owner_posts(&self, owner: Uuid) -> Result<Vec<Post>>;

    // ---- playlists ---------------------------------------------------

    async fn insert_playlist(&self, owner_id: Uuid, name: &str, description: &str)
        -> Result<Playlist>;

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>>;

    async fn update_playlist(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Playlist>>;

    async fn delete_playlist(&self, id: Uuid) -> Result<bool>;

    async fn list_owner_playlists(&self, owner: Uuid) -> Result<Vec<Playlist>>;

    /// Append a video unless already present
    async fn add_playlist_video(&self, playlist_id: Uuid, video_id: Uuid)
        -> Result<Option<Playlist>>;

    async fn remove_playlist_video(&self, playlist_id: Uuid, video_id: Uuid)
        -> Result<Option<Playlist>>;

    // ---- engagement --------------------------------------------------

    /// Flip the (actor, target) like. Returns whether a like exists afterwards.
    async fn toggle_like(&self, actor: Uuid, target: LikeTarget) -> Result<bool>;

    async fn count_likes(&self, target: LikeTarget) -> Result<i64>;

    /// Videos liked by `user` that the user can still see, most recent like first
    async fn list_liked_videos(&self, user: Uuid) -> Result<Vec<LikedVideo>>;

    /// Flip the (subscriber, channel) edge. Returns whether it exists afterwards.
    async fn toggle_subscription(&self, subscriber: Uuid, channel: Uuid) -> Result<bool>;

    async fn is_subscribed(&self, subscriber: Uuid, channel: Uuid) -> Result<bool>;

    async fn count_subscribers(&self, channel: Uuid) -> Result<i64>;

    async fn count_subscriptions(&self, subscriber: Uuid) -> Result<i64>;

    async fn list_subscribers(&self, channel: Uuid) -> Result<Vec<UserSummary>>;

    async fn list_subscribed_channels(&self, subscriber: Uuid) -> Result<Vec<UserSummary>>;

    async fn count_owner_videos(&self, owner: Uuid) -> Result<i64>;

    /// Sum of likes over every video the owner has
    async fn count_owner_video_likes(&self, owner: Uuid) -> Result<i64>;
}
