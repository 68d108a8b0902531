/// In-process entity store
///
/// Keeps every table behind one `RwLock`, so each trait call observes and
/// mutates a consistent snapshot. Toggles and cascades hold the write lock for
/// their whole duration, which gives them the same atomicity the SQL store gets
/// from single statements and transactions.
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::EntityStore;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, Like, LikeTarget, LikedVideo, NewVideo, Playlist, Post, SortDirection, Subscription,
    User, UserSummary, Video, VideoChanges, VideoQuery, VideoSortField,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    videos: HashMap<Uuid, Video>,
    comments: HashMap<Uuid, Comment>,
    posts: HashMap<Uuid, Post>,
    playlists: HashMap<Uuid, Playlist>,
    likes: Vec<Like>,
    subscriptions: Vec<Subscription>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing clock so insertion order is also timestamp order
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn remove_likes_on(&mut self, target: LikeTarget) {
        self.likes.retain(|like| like.target != target);
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn summary(tables: &Tables, id: Uuid) -> Option<UserSummary> {
    tables.users.get(&id).map(UserSummary::from)
}

fn compare_videos(a: &Video, b: &Video, field: VideoSortField) -> std::cmp::Ordering {
    let primary = match field {
        VideoSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        VideoSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        VideoSortField::Title => a.title.cmp(&b.title),
        VideoSortField::Duration => a.duration.total_cmp(&b.duration),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait::async_trait]
impl EntityStore for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        let _tables = self.tables.read().await;
        Ok(())
    }

    async fn upsert_user(&self, user: &User) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(AppError::InvalidArgument(
                "username is already taken".to_string(),
            ));
        }
        let stored = match tables.users.get(&user.id) {
            Some(existing) => User {
                created_at: existing.created_at,
                ..user.clone()
            },
            None => user.clone(),
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_video(&self, video: NewVideo) -> Result<Video> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        let video = Video {
            id: Uuid::new_v4(),
            owner_id: video.owner_id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration,
            is_published: false,
            created_at: now,
            updated_at: now,
        };
        tables.videos.insert(video.id, video.clone());
        Ok(video)
    }

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>> {
        Ok(self.tables.read().await.videos.get(&id).cloned())
    }

    async fn update_video(&self, id: Uuid, changes: &VideoChanges) -> Result<Option<Video>> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        let Some(video) = tables.videos.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            video.title = title.clone();
        }
        if let Some(description) = &changes.description {
            video.description = description.clone();
        }
        if let Some(thumbnail) = &changes.thumbnail_url {
            video.thumbnail_url = thumbnail.clone();
        }
        video.updated_at = now;
        Ok(Some(video.clone()))
    }

    async fn set_video_published(&self, id: Uuid, published: bool) -> Result<Option<Video>> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        Ok(tables.videos.get_mut(&id).map(|video| {
            video.is_published = published;
            video.updated_at = now;
            video.clone()
        }))
    }

    async fn delete_video_cascade(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.videos.remove(&id).is_none() {
            return Ok(false);
        }

        let comment_ids: Vec<Uuid> = tables
            .comments
            .values()
            .filter(|c| c.video_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in comment_ids {
            tables.comments.remove(&comment_id);
            tables.remove_likes_on(LikeTarget::Comment(comment_id));
        }
        tables.remove_likes_on(LikeTarget::Video(id));

        let now = tables.now();
        for playlist in tables.playlists.values_mut() {
            if playlist.videos.contains(&id) {
                playlist.videos.retain(|v| *v != id);
                playlist.updated_at = now;
            }
        }

        Ok(true)
    }

    async fn list_videos(&self, query: &VideoQuery) -> Result<(Vec<Video>, i64)> {
        let tables = self.tables.read().await;
        let needle = query.title.as_ref().map(|t| t.to_lowercase());

        let mut matches: Vec<&Video> = tables
            .videos
            .values()
            .filter(|v| v.visible_to(query.viewer))
            .filter(|v| query.owner.map_or(true, |owner| v.owner_id == owner))
            .filter(|v| {
                needle
                    .as_ref()
                    .map_or(true, |n| v.title.to_lowercase().contains(n.as_str()))
            })
            .collect();

        matches.sort_by(|a, b| {
            let ordering = compare_videos(a, b, query.sort_by);
            match query.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = matches.len() as i64;
        let videos = matches
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit as usize)
            .cloned()
            .collect();

        Ok((videos, total))
    }

    async fn list_owner_videos(&self, owner: Uuid, include_drafts: bool) -> Result<Vec<Video>> {
        let tables = self.tables.read().await;
        let mut videos: Vec<Video> = tables
            .videos
            .values()
            .filter(|v| v.owner_id == owner && (v.is_published || include_drafts))
            .cloned()
            .collect();
        videos.sort_by(|a, b| compare_videos(b, a, VideoSortField::CreatedAt));
        Ok(videos)
    }

    async fn insert_comment(
        &self,
        video_id: Uuid,
        owner_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        let comment = Comment {
            id: Uuid::new_v4(),
            video_id,
            owner_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<Comment>> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        Ok(tables.comments.get_mut(&id).map(|comment| {
            comment.content = content.to_string();
            comment.updated_at = now;
            comment.clone()
        }))
    }

    async fn delete_comment_cascade(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.comments.remove(&id).is_none() {
            return Ok(false);
        }
        tables.remove_likes_on(LikeTarget::Comment(id));
        Ok(true)
    }

    async fn list_video_comments(
        &self,
        video_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.video_id == video_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(comments
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert_post(&self, owner_id: Uuid, content: &str) -> Result<Post> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        let post = Post {
            id: Uuid::new_v4(),
            owner_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn update_post(&self, id: Uuid, content: &str) -> Result<Option<Post>> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        Ok(tables.posts.get_mut(&id).map(|post| {
            post.content = content.to_string();
            post.updated_at = now;
            post.clone()
        }))
    }

    async fn delete_post_cascade(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Ok(false);
        }
        tables.remove_likes_on(LikeTarget::Post(id));
        Ok(true)
    }

    async fn list_owner_posts(&self, owner: Uuid) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.owner_id == owner)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn insert_playlist(
        &self,
        owner_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Playlist> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        let playlist = Playlist {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            description: description.to_string(),
            videos: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.playlists.insert(playlist.id, playlist.clone());
        Ok(playlist)
    }

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        Ok(self.tables.read().await.playlists.get(&id).cloned())
    }

    async fn update_playlist(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Playlist>> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        Ok(tables.playlists.get_mut(&id).map(|playlist| {
            if let Some(name) = name {
                playlist.name = name.to_string();
            }
            if let Some(description) = description {
                playlist.description = description.to_string();
            }
            playlist.updated_at = now;
            playlist.clone()
        }))
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.playlists.remove(&id).is_some())
    }

    async fn list_owner_playlists(&self, owner: Uuid) -> Result<Vec<Playlist>> {
        let tables = self.tables.read().await;
        let mut playlists: Vec<Playlist> = tables
            .playlists
            .values()
            .filter(|p| p.owner_id == owner)
            .cloned()
            .collect();
        playlists.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(playlists)
    }

    async fn add_playlist_video(
        &self,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<Option<Playlist>> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        Ok(tables.playlists.get_mut(&playlist_id).map(|playlist| {
            if !playlist.videos.contains(&video_id) {
                playlist.videos.push(video_id);
            }
            playlist.updated_at = now;
            playlist.clone()
        }))
    }

    async fn remove_playlist_video(
        &self,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<Option<Playlist>> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        Ok(tables.playlists.get_mut(&playlist_id).map(|playlist| {
            playlist.videos.retain(|v| *v != video_id);
            playlist.updated_at = now;
            playlist.clone()
        }))
    }

    async fn toggle_like(&self, actor: Uuid, target: LikeTarget) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.likes.len();
        tables
            .likes
            .retain(|like| !(like.liked_by == actor && like.target == target));
        if tables.likes.len() < before {
            return Ok(false);
        }

        let created_at = tables.now();
        tables.likes.push(Like {
            id: Uuid::new_v4(),
            liked_by: actor,
            target,
            created_at,
        });
        Ok(true)
    }

    async fn count_likes(&self, target: LikeTarget) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.likes.iter().filter(|like| like.target == target).count() as i64)
    }

    async fn list_liked_videos(&self, user: Uuid) -> Result<Vec<LikedVideo>> {
        let tables = self.tables.read().await;
        let mut likes: Vec<&Like> = tables
            .likes
            .iter()
            .filter(|like| like.liked_by == user)
            .collect();
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(likes
            .into_iter()
            .filter_map(|like| match like.target {
                LikeTarget::Video(video_id) => tables.videos.get(&video_id),
                LikeTarget::Comment(_) | LikeTarget::Post(_) => None,
            })
            .filter(|video| video.visible_to(user))
            .map(|video| LikedVideo {
                id: video.id,
                thumbnail: video.thumbnail_url.clone(),
                title: video.title.clone(),
                description: video.description.clone(),
            })
            .collect())
    }

    async fn toggle_subscription(&self, subscriber: Uuid, channel: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.subscriptions.len();
        tables
            .subscriptions
            .retain(|s| !(s.subscriber_id == subscriber && s.channel_id == channel));
        if tables.subscriptions.len() < before {
            return Ok(false);
        }

        let created_at = tables.now();
        tables.subscriptions.push(Subscription {
            id: Uuid::new_v4(),
            subscriber_id: subscriber,
            channel_id: channel,
            created_at,
        });
        Ok(true)
    }

    async fn is_subscribed(&self, subscriber: Uuid, channel: Uuid) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .any(|s| s.subscriber_id == subscriber && s.channel_id == channel))
    }

    async fn count_subscribers(&self, channel: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.channel_id == channel)
            .count() as i64)
    }

    async fn count_subscriptions(&self, subscriber: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.subscriber_id == subscriber)
            .count() as i64)
    }

    async fn list_subscribers(&self, channel: Uuid) -> Result<Vec<UserSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.channel_id == channel)
            .filter_map(|s| summary(&tables, s.subscriber_id))
            .collect())
    }

    async fn list_subscribed_channels(&self, subscriber: Uuid) -> Result<Vec<UserSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.subscriber_id == subscriber)
            .filter_map(|s| summary(&tables, s.channel_id))
            .collect())
    }

    async fn count_owner_videos(&self, owner: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.videos.values().filter(|v| v.owner_id == owner).count() as i64)
    }

    async fn count_owner_video_likes(&self, owner: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .iter()
            .filter(|like| match like.target {
                LikeTarget::Video(video_id) => tables
                    .videos
                    .get(&video_id)
                    .map_or(false, |v| v.owner_id == owner),
                _ => false,
            })
            .count() as i64)
    }
}
