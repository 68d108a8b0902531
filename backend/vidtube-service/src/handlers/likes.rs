/// Like handlers - toggles and the liked-videos feed
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::EngagementKind;
use crate::response;
use crate::services::EngagementService;
use crate::AppState;

async fn toggle(
    state: &AppState,
    kind: EngagementKind,
    label: &str,
    actor: Uuid,
    target_id: Uuid,
) -> Result<HttpResponse> {
    let outcome = EngagementService::new(state.store.clone())
        .toggle_engagement(kind, actor, target_id)
        .await?;

    let verb = if outcome.active { "Liked" } else { "Unliked" };
    Ok(response::ok(outcome, format!("{} {} Successfully", label, verb)))
}

pub async fn toggle_video_like(
    state: web::Data<AppState>,
    user: UserId,
    video_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    toggle(&state, EngagementKind::VideoLike, "Video", user.0, *video_id).await
}

pub async fn toggle_comment_like(
    state: web::Data<AppState>,
    user: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    toggle(&state, EngagementKind::CommentLike, "Comment", user.0, *comment_id).await
}

/// Also mounted at `/posts/{id}/like`
pub async fn toggle_tweet_like(
    state: web::Data<AppState>,
    user: UserId,
    tweet_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    toggle(&state, EngagementKind::TweetLike, "Tweet", user.0, *tweet_id).await
}

pub async fn get_liked_videos(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    let videos = EngagementService::new(state.store.clone())
        .list_liked_videos(user.0)
        .await?;

    let message = if videos.is_empty() {
        "You haven't liked any Video yet"
    } else {
        "Liked videos fetched successfully"
    };
    Ok(response::ok(videos, message))
}
