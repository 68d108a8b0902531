/// Business logic layer for vidtube-service
pub mod comments;
pub mod engagement;
pub mod media;
pub mod playlists;
pub mod posts;
pub mod users;
pub mod videos;

pub use comments::CommentService;
pub use engagement::EngagementService;
pub use media::{CloudinaryGateway, MediaError, MediaGateway, UploadedMedia};
pub use playlists::PlaylistService;
pub use posts::PostService;
pub use users::ProfileService;
pub use videos::{VideoService, VideoUpload};

use crate::error::{AppError, Result};

/// Trimmed text that must not be blank
pub(crate) fn require_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidArgument(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trimmed optional text; present-but-blank is rejected
pub(crate) fn optional_text(value: Option<&str>, field: &str) -> Result<Option<String>> {
    value.map(|v| require_text(v, field)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("  hi ", "content").unwrap(), "hi");
        assert!(matches!(
            require_text(" \n\t", "content"),
            Err(AppError::InvalidArgument(msg)) if msg == "content is required"
        ));
        assert_eq!(optional_text(None, "name").unwrap(), None);
        assert!(optional_text(Some(""), "name").is_err());
    }
}
