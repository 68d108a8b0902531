/// Channel dashboard handlers
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::response;
use crate::services::EngagementService;
use crate::AppState;

pub async fn get_channel_stats(
    state: web::Data<AppState>,
    user: UserId,
    channel_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let stats = EngagementService::new(state.store.clone())
        .channel_stats(*channel_id, user.0)
        .await?;

    Ok(response::ok(stats, "Channel stats fetched successfully"))
}

pub async fn get_channel_videos(
    state: web::Data<AppState>,
    user: UserId,
    channel_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let videos = EngagementService::new(state.store.clone())
        .list_channel_videos(*channel_id, user.0)
        .await?;

    let message = if videos.is_empty() {
        "No videos found"
    } else {
        "Channel videos fetched successfully"
    };
    Ok(response::ok(videos, message))
}
