/// Playlist handlers
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::middleware::UserId;
use crate::response;
use crate::services::PlaylistService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaylistRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlaylistRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    pub description: Option<String>,
}

fn service(state: &AppState) -> PlaylistService {
    PlaylistService::new(state.store.clone())
}

pub async fn create_playlist(
    state: web::Data<AppState>,
    user: UserId,
    req: web::Json<CreatePlaylistRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let playlist = service(&state)
        .create_playlist(user.0, &req.name, &req.description)
        .await?;

    Ok(response::created(playlist, "Playlist created successfully"))
}

pub async fn get_user_playlists(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let playlists = service(&state).get_user_playlists(*user_id).await?;
    let message = if playlists.is_empty() {
        "No playlists found"
    } else {
        "Playlists fetched successfully"
    };
    Ok(response::ok(playlists, message))
}

pub async fn get_playlist_by_id(
    state: web::Data<AppState>,
    playlist_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let playlist = service(&state).get_playlist(*playlist_id).await?;
    Ok(response::ok(playlist, "Playlist fetched successfully"))
}

pub async fn update_playlist(
    state: web::Data<AppState>,
    user: UserId,
    playlist_id: web::Path<Uuid>,
    req: web::Json<UpdatePlaylistRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let playlist = service(&state)
        .update_playlist(
            *playlist_id,
            user.0,
            req.name.as_deref(),
            req.description.as_deref(),
        )
        .await?;

    Ok(response::ok(playlist, "Playlist updated successfully"))
}

pub async fn delete_playlist(
    state: web::Data<AppState>,
    user: UserId,
    playlist_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let playlist = service(&state).delete_playlist(*playlist_id, user.0).await?;
    Ok(response::ok(playlist, "Playlist deleted successfully"))
}

pub async fn add_video_to_playlist(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();
    let playlist = service(&state)
        .add_video(playlist_id, video_id, user.0)
        .await?;

    Ok(response::ok(playlist, "Video added to playlist successfully"))
}

pub async fn remove_video_from_playlist(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();
    let playlist = service(&state)
        .remove_video(playlist_id, video_id, user.0)
        .await?;

    Ok(response::ok(playlist, "Video removed from playlist successfully"))
}
