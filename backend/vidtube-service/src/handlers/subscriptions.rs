/// Subscription handlers
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::EngagementKind;
use crate::response;
use crate::services::EngagementService;
use crate::AppState;

pub async fn toggle_subscription(
    state: web::Data<AppState>,
    user: UserId,
    channel_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = EngagementService::new(state.store.clone())
        .toggle_engagement(EngagementKind::Subscription, user.0, *channel_id)
        .await?;

    let message = if outcome.active {
        "Subscribed Successfully"
    } else {
        "Unsubscribed Successfully"
    };
    Ok(response::ok(outcome, message))
}

pub async fn get_channel_subscribers(
    state: web::Data<AppState>,
    channel_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let subscribers = EngagementService::new(state.store.clone())
        .list_subscribers(*channel_id)
        .await?;

    let message = if subscribers.is_empty() {
        "No subscribers found"
    } else {
        "Subscribers fetched successfully"
    };
    Ok(response::ok(subscribers, message))
}

pub async fn get_subscribed_channels(
    state: web::Data<AppState>,
    subscriber_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let channels = EngagementService::new(state.store.clone())
        .list_subscribed_channels(*subscriber_id)
        .await?;

    Ok(response::ok(channels, "SubscribedTo fetched successfully"))
}
