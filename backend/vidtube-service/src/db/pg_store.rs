/// PostgreSQL-backed entity store
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::EntityStore;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, LikeTarget, LikedVideo, NewVideo, Playlist, Post, User, UserSummary, Video,
    VideoChanges, VideoQuery,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Escape LIKE wildcards so user text matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn push_video_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &VideoQuery) {
    qb.push(" WHERE (is_published OR owner_id = ")
        .push_bind(query.viewer)
        .push(")");
    if let Some(owner) = query.owner {
        qb.push(" AND owner_id = ").push_bind(owner);
    }
    if let Some(title) = &query.title {
        qb.push(" AND title ILIKE ")
            .push_bind(format!("%{}%", escape_like(title)));
    }
}

#[async_trait::async_trait]
impl EntityStore for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_user(&self, user: &User) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, fullname, avatar, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET username = EXCLUDED.username,
                fullname = EXCLUDED.fullname,
                avatar = EXCLUDED.avatar,
                updated_at = NOW()
            RETURNING id, username, fullname, avatar, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.fullname)
        .bind(&user.avatar)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::InvalidArgument("username is already taken".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, fullname, avatar, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_video(&self, video: NewVideo) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos (id, owner_id, title, description, video_url, thumbnail_url, duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, title, description, video_url, thumbnail_url, duration,
                      is_published, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(video.owner_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_url)
        .bind(&video.thumbnail_url)
        .bind(video.duration)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, owner_id, title, description, video_url, thumbnail_url, duration,
                   is_published, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn update_video(&self, id: Uuid, changes: &VideoChanges) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail_url = COALESCE($4, thumbnail_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, title, description, video_url, thumbnail_url, duration,
                      is_published, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.thumbnail_url.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn set_video_published(&self, id: Uuid, published: bool) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET is_published = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, title, description, video_url, thumbnail_url, duration,
                      is_published, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(published)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn delete_video_cascade(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM likes
            WHERE target_kind = 'comment'
              AND target_id IN (SELECT id FROM comments WHERE video_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = 'video' AND target_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE video_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE playlists
            SET videos = array_remove(videos, $1), updated_at = NOW()
            WHERE $1 = ANY(videos)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_videos(&self, query: &VideoQuery) -> Result<(Vec<Video>, i64)> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM videos");
        push_video_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, owner_id, title, description, video_url, thumbnail_url, duration, \
             is_published, created_at, updated_at FROM videos",
        );
        push_video_filters(&mut qb, query);
        // Column and direction come from closed enums, never from request text
        let direction = query.sort_direction.as_sql();
        qb.push(format!(
            " ORDER BY {} {}, id {}",
            query.sort_by.column(),
            direction,
            direction
        ));
        qb.push(" LIMIT ")
            .push_bind(query.page.limit as i64)
            .push(" OFFSET ")
            .push_bind(query.page.offset());

        let videos = qb.build_query_as::<Video>().fetch_all(&self.pool).await?;

        Ok((videos, total))
    }

    async fn list_owner_videos(&self, owner: Uuid, include_drafts: bool) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, owner_id, title, description, video_url, thumbnail_url, duration,
                   is_published, created_at, updated_at
            FROM videos
            WHERE owner_id = $1 AND (is_published OR $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner)
        .bind(include_drafts)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    async fn insert_comment(
        &self,
        video_id: Uuid,
        owner_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, video_id, owner_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, video_id, owner_id, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(video_id)
        .bind(owner_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, video_id, owner_id, content, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, video_id, owner_id, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete_comment_cascade(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = 'comment' AND target_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_video_comments(
        &self,
        video_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, video_id, owner_id, content, created_at, updated_at
            FROM comments
            WHERE video_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(video_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn insert_post(&self, owner_id: Uuid, content: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, owner_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, owner_id, content, created_at, updated_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn update_post(&self, id: Uuid, content: &str) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post_cascade(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = 'tweet' AND target_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_owner_posts(&self, owner: Uuid) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, owner_id, content, created_at, updated_at
            FROM posts
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn insert_playlist(
        &self,
        owner_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Playlist> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            INSERT INTO playlists (id, owner_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, description, videos, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, owner_id, name, description, videos, created_at, updated_at
            FROM playlists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn update_playlist(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            UPDATE playlists
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, name, description, videos, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_owner_playlists(&self, owner: Uuid) -> Result<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, owner_id, name, description, videos, created_at, updated_at
            FROM playlists
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    async fn add_playlist_video(
        &self,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            UPDATE playlists
            SET videos = CASE WHEN $2 = ANY(videos) THEN videos ELSE array_append(videos, $2) END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, name, description, videos, created_at, updated_at
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn remove_playlist_video(
        &self,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            UPDATE playlists
            SET videos = array_remove(videos, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, name, description, videos, created_at, updated_at
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn toggle_like(&self, actor: Uuid, target: LikeTarget) -> Result<bool> {
        // Delete-or-insert in one statement. A conflict on insert means a
        // concurrent toggle created the row first, so the like exists.
        let row = sqlx::query(
            r#"
            WITH removed AS (
                DELETE FROM likes
                WHERE liked_by = $1 AND target_kind = $2 AND target_id = $3
                RETURNING id
            ), inserted AS (
                INSERT INTO likes (id, liked_by, target_kind, target_id)
                SELECT $4, $1, $2, $3
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT (liked_by, target_kind, target_id) DO NOTHING
                RETURNING id
            )
            SELECT EXISTS (SELECT 1 FROM removed) AS removed
            "#,
        )
        .bind(actor)
        .bind(target.kind())
        .bind(target.id())
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await?;

        let removed: bool = row.try_get("removed")?;
        Ok(!removed)
    }

    async fn count_likes(&self, target: LikeTarget) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM likes WHERE target_kind = $1 AND target_id = $2",
        )
        .bind(target.kind())
        .bind(target.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_liked_videos(&self, user: Uuid) -> Result<Vec<LikedVideo>> {
        let videos = sqlx::query_as::<_, LikedVideo>(
            r#"
            SELECT v.id, v.thumbnail_url AS thumbnail, v.title, v.description
            FROM likes l
            JOIN videos v ON v.id = l.target_id
            WHERE l.liked_by = $1
              AND l.target_kind = 'video'
              AND (v.is_published OR v.owner_id = $1)
            ORDER BY l.created_at DESC, l.id DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    async fn toggle_subscription(&self, subscriber: Uuid, channel: Uuid) -> Result<bool> {
        let row = sqlx::query(
            r#"
            WITH removed AS (
                DELETE FROM subscriptions
                WHERE subscriber_id = $1 AND channel_id = $2
                RETURNING id
            ), inserted AS (
                INSERT INTO subscriptions (id, subscriber_id, channel_id)
                SELECT $3, $1, $2
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT (subscriber_id, channel_id) DO NOTHING
                RETURNING id
            )
            SELECT EXISTS (SELECT 1 FROM removed) AS removed
            "#,
        )
        .bind(subscriber)
        .bind(channel)
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await?;

        let removed: bool = row.try_get("removed")?;
        Ok(!removed)
    }

    async fn is_subscribed(&self, subscriber: Uuid, channel: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE subscriber_id = $1 AND channel_id = $2
            )
            "#,
        )
        .bind(subscriber)
        .bind(channel)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_subscribers(&self, channel: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
                .bind(channel)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn count_subscriptions(&self, subscriber: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1")
                .bind(subscriber)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn list_subscribers(&self, channel: Uuid) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.fullname, u.avatar
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at ASC, s.id ASC
            "#,
        )
        .bind(channel)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn list_subscribed_channels(&self, subscriber: Uuid) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.fullname, u.avatar
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at ASC, s.id ASC
            "#,
        )
        .bind(subscriber)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count_owner_videos(&self, owner: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE owner_id = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_owner_video_likes(&self, owner: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM likes l
            JOIN videos v ON v.id = l.target_id
            WHERE l.target_kind = 'video' AND v.owner_id = $1
            "#,
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_neutralises_wildcards() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
