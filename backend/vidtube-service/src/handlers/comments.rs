/// Comment handlers - HTTP endpoints for comment operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::Page;
use crate::response;
use crate::services::{CommentService, EngagementService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Request body for creating or editing a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    pub content: String,
}

/// Comments for a video, oldest first
pub async fn get_video_comments(
    state: web::Data<AppState>,
    user: UserId,
    video_id: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let page = Page::resolve(query.page, query.limit, &state.pagination)?;
    let comments = EngagementService::new(state.store.clone())
        .list_comments(*video_id, user.0, page)
        .await?;

    let message = if comments.is_empty() {
        "No comments found"
    } else {
        "Comments fetched successfully"
    };
    Ok(response::ok(comments, message))
}

pub async fn add_comment(
    state: web::Data<AppState>,
    user: UserId,
    video_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let comment = CommentService::new(state.store.clone())
        .create_comment(*video_id, user.0, &req.content)
        .await?;

    Ok(response::created(comment, "Comment added successfully"))
}

pub async fn update_comment(
    state: web::Data<AppState>,
    user: UserId,
    comment_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let comment = CommentService::new(state.store.clone())
        .update_comment(*comment_id, user.0, &req.content)
        .await?;

    Ok(response::ok(comment, "Comment updated successfully"))
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    user: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comment = CommentService::new(state.store.clone())
        .delete_comment(*comment_id, user.0)
        .await?;

    Ok(response::ok(comment, "Comment deleted successfully"))
}
