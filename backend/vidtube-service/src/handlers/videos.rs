/// Video handlers - HTTP endpoints for the video catalogue
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::uploads::read_upload_form;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{Page, SortDirection, VideoQuery, VideoSortField};
use crate::response;
use crate::services::{VideoService, VideoUpload};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVideosParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Title search text
    pub query: Option<String>,
    #[serde(default)]
    pub sort_by: VideoSortField,
    #[serde(default)]
    pub sort_type: SortDirection,
    pub user_id: Option<Uuid>,
}

fn service(state: &AppState) -> VideoService {
    VideoService::new(state.store.clone(), state.media.clone())
}

/// List, search and paginate videos
pub async fn get_all_videos(
    state: web::Data<AppState>,
    user: UserId,
    params: web::Query<ListVideosParams>,
) -> Result<HttpResponse> {
    let params = params.into_inner();
    let query = VideoQuery {
        viewer: user.0,
        owner: params.user_id,
        title: params
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
        sort_by: params.sort_by,
        sort_direction: params.sort_type,
        page: Page::resolve(params.page, params.limit, &state.pagination)?,
    };

    let page = service(&state).list_videos(query).await?;
    Ok(response::ok(page, "Videos fetched successfully"))
}

/// Upload a new video (multipart: title, description, videoFile, thumbnail)
pub async fn publish_a_video(
    state: web::Data<AppState>,
    user: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_upload_form(payload, &state.media_config).await?;

    let video_file = form
        .take_file("videoFile")
        .ok_or_else(|| AppError::InvalidArgument("videoFile is required".to_string()))?;
    let thumbnail = form
        .take_file("thumbnail")
        .ok_or_else(|| AppError::InvalidArgument("thumbnail is required".to_string()))?;

    let upload = VideoUpload {
        title: form.text("title").unwrap_or_default().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        video_file: video_file.path().to_path_buf(),
        thumbnail: thumbnail.path().to_path_buf(),
    };

    let video = service(&state).publish_video(upload, user.0).await?;
    Ok(response::created(video, "Video uploaded successfully"))
}

pub async fn get_video_by_id(
    state: web::Data<AppState>,
    user: UserId,
    video_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video = service(&state).get_video(*video_id, user.0).await?;
    Ok(response::ok(video, "Video fetched successfully"))
}

/// Owner edit (multipart: title?, description?, thumbnail?)
pub async fn update_video(
    state: web::Data<AppState>,
    user: UserId,
    video_id: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_upload_form(payload, &state.media_config).await?;
    let thumbnail = form.take_file("thumbnail");

    let video = service(&state)
        .update_video(
            *video_id,
            user.0,
            form.text("title"),
            form.text("description"),
            thumbnail.as_ref().map(|f| f.path().to_path_buf()),
        )
        .await?;
    Ok(response::ok(video, "Video updated successfully"))
}

pub async fn delete_video(
    state: web::Data<AppState>,
    user: UserId,
    video_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video = service(&state).delete_video(*video_id, user.0).await?;
    Ok(response::ok(video, "Video deleted successfully"))
}

pub async fn toggle_publish_status(
    state: web::Data<AppState>,
    user: UserId,
    video_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video = service(&state)
        .toggle_publish_status(*video_id, user.0)
        .await?;
    let message = if video.is_published {
        "Video published successfully"
    } else {
        "Video unpublished successfully"
    };
    Ok(response::ok(video, message))
}
