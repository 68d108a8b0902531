/// Data models for vidtube-service
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::config::PaginationConfig;
use crate::error::{AppError, Result};

// =====================================================================
// Entities
// =====================================================================

/// User (channel) record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub avatar: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            fullname: user.fullname.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "videoFile")]
    pub video_url: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    pub duration: f64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Drafts are only visible to their owner
    pub fn visible_to(&self, viewer: Uuid) -> bool {
        self.is_published || self.owner_id == viewer
    }
}

/// Video joined with its owner's public profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(flatten)]
    pub video: Video,
    pub owner_details: UserSummary,
}

/// Fields for a freshly uploaded video
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
}

/// Partial update applied by the owner
#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl VideoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.thumbnail_url.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    #[serde(rename = "video")]
    pub video_id: Uuid,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Community post ("tweet")
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    /// Video ids in first-insertion order, no repeats
    pub videos: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =====================================================================
// Engagement graph
// =====================================================================

/// What a like points at. Exactly one target per like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    #[serde(rename = "tweet")]
    Post(Uuid),
}

impl LikeTarget {
    /// Stored discriminator
    pub fn kind(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video",
            LikeTarget::Comment(_) => "comment",
            LikeTarget::Post(_) => "tweet",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Post(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub liked_by: Uuid,
    pub target: LikeTarget,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    #[serde(rename = "subscriber")]
    pub subscriber_id: Uuid,
    #[serde(rename = "channel")]
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Engagement relations that flip on each call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementKind {
    VideoLike,
    CommentLike,
    TweetLike,
    Subscription,
}

impl EngagementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementKind::VideoLike => "video_like",
            EngagementKind::CommentLike => "comment_like",
            EngagementKind::TweetLike => "tweet_like",
            EngagementKind::Subscription => "subscription",
        }
    }
}

/// State of an engagement relation after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    /// Whether the relation exists now
    pub active: bool,
    /// Relations of this kind on the target after the toggle
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub subscriber_count: i64,
    pub subscribed_to_count: i64,
    pub is_subscribed: bool,
    pub total_video_count: i64,
    pub total_likes_across_videos: i64,
}

/// Liked video reduced to what a listing card shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LikedVideo {
    pub id: Uuid,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
}

// =====================================================================
// Listing
// =====================================================================

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    /// Apply defaults and bounds to raw query parameters
    pub fn resolve(page: Option<u32>, limit: Option<u32>, config: &PaginationConfig) -> Result<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(config.default_limit);

        if page == 0 {
            return Err(AppError::InvalidArgument("page must be at least 1".to_string()));
        }
        if limit == 0 || limit > config.max_limit {
            return Err(AppError::InvalidArgument(format!(
                "limit must be between 1 and {}",
                config.max_limit
            )));
        }

        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit as i64 - 1) / self.limit as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum VideoSortField {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "updatedAt")]
    UpdatedAt,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "duration")]
    Duration,
}

impl VideoSortField {
    pub fn column(&self) -> &'static str {
        match self {
            VideoSortField::CreatedAt => "created_at",
            VideoSortField::UpdatedAt => "updated_at",
            VideoSortField::Title => "title",
            VideoSortField::Duration => "duration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Resolved filter for the video catalogue
#[derive(Debug, Clone)]
pub struct VideoQuery {
    /// Sees their own drafts in addition to published videos
    pub viewer: Uuid,
    pub owner: Option<Uuid>,
    /// Case-insensitive title substring
    pub title: Option<String>,
    pub sort_by: VideoSortField,
    pub sort_direction: SortDirection,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPagination {
    pub total_videos: i64,
    pub total_pages: i64,
    pub current_page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoPage {
    pub videos: Vec<Video>,
    pub pagination: VideoPagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_bounds() {
        let config = PaginationConfig::default();
        let page = Page::resolve(None, None, &config).unwrap();
        assert_eq!(page, Page { page: 1, limit: 10 });
        assert_eq!(page.offset(), 0);

        let second = Page::resolve(Some(2), Some(10), &config).unwrap();
        assert_eq!(second.offset(), 10);

        assert!(Page::resolve(Some(0), None, &config).is_err());
        assert!(Page::resolve(None, Some(0), &config).is_err());
        assert!(Page::resolve(None, Some(101), &config).is_err());
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page { page: 1, limit: 10 };
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
    }

    #[test]
    fn sort_field_accepts_only_whitelisted_names() {
        let parsed: VideoSortField = serde_json::from_str("\"duration\"").unwrap();
        assert_eq!(parsed.column(), "duration");
        assert!(serde_json::from_str::<VideoSortField>("\"owner_id; DROP TABLE\"").is_err());
    }
}
