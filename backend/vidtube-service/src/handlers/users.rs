/// Profile handlers
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::error::Result;
use crate::middleware::UserId;
use crate::response;
use crate::services::ProfileService;
use crate::AppState;

/// Profile fields forwarded by the identity provider
#[derive(Debug, Deserialize, Validate)]
pub struct SyncProfileRequest {
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "must be 1-128 characters"))]
    pub fullname: String,
    #[validate(url(message = "must be a URL"))]
    pub avatar: Option<String>,
}

pub async fn sync_profile(
    state: web::Data<AppState>,
    user: UserId,
    req: web::Json<SyncProfileRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let profile = ProfileService::new(state.store.clone())
        .sync_profile(user.0, &req.username, &req.fullname, req.avatar.as_deref())
        .await?;

    Ok(response::ok(profile, "Profile synced successfully"))
}
