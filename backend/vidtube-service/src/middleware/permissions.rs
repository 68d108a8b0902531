/// Authorization module for vidtube-service
///
/// Users can only modify content they own. Every update, delete, publish toggle
/// and playlist membership change goes through `ensure_owner`.
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Comment, Playlist, Post, Video};

/// Entities that carry an owner reference
pub trait Owned {
    /// Label used in denial messages
    const KIND: &'static str;

    fn owner_id(&self) -> Uuid;
}

impl Owned for Video {
    const KIND: &'static str = "video";

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for Comment {
    const KIND: &'static str = "comment";

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for Playlist {
    const KIND: &'static str = "playlist";

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for Post {
    const KIND: &'static str = "tweet";

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Whether `actor` owns `entity`
pub fn actor_owns<T: Owned>(entity: &T, actor: Uuid) -> bool {
    entity.owner_id() == actor
}

/// Fail with PermissionDenied unless `actor` owns `entity`
pub fn ensure_owner<T: Owned>(entity: &T, actor: Uuid, action: &str) -> Result<()> {
    if actor_owns(entity, actor) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %actor,
        owner_id = %entity.owner_id(),
        kind = T::KIND,
        action,
        "ownership check denied"
    );
    Err(AppError::PermissionDenied(format!(
        "You don't have permission to {} this {}",
        action,
        T::KIND
    )))
}
