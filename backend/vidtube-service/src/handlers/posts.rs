/// Post handlers - community posts ("tweets")
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::middleware::UserId;
use crate::response;
use crate::services::PostService;
use crate::AppState;

/// Request body for creating or editing a post
#[derive(Debug, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub content: String,
}

fn service(state: &AppState) -> PostService {
    PostService::new(state.store.clone())
}

pub async fn create_post(
    state: web::Data<AppState>,
    user: UserId,
    req: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let post = service(&state).create_post(user.0, &req.content).await?;
    Ok(response::created(post, "Tweet created successfully"))
}

pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service(&state).get_post(*post_id).await?;
    Ok(response::ok(post, "Tweet fetched successfully"))
}

pub async fn get_user_posts(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let posts = service(&state).get_user_posts(*user_id).await?;
    let message = if posts.is_empty() {
        "No tweets found"
    } else {
        "Tweets fetched successfully"
    };
    Ok(response::ok(posts, message))
}

pub async fn update_post(
    state: web::Data<AppState>,
    user: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let post = service(&state)
        .update_post(*post_id, user.0, &req.content)
        .await?;
    Ok(response::ok(post, "Tweet updated successfully"))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service(&state).delete_post(*post_id, user.0).await?;
    Ok(response::ok(post, "Tweet deleted successfully"))
}
