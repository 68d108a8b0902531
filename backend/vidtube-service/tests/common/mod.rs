//! Shared fixtures for HTTP integration tests
//!
//! Builds the full `/api/v1` app over the in-memory store with a fake media
//! gateway, seeds users and videos, and mints bearer tokens.

#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use vidtube_service::config::{AuthConfig, MediaConfig, PaginationConfig};
use vidtube_service::db::{EntityStore, InMemoryStore};
use vidtube_service::middleware::{Claims, JwtValidator};
use vidtube_service::models::{NewVideo, User};
use vidtube_service::services::{MediaError, MediaGateway, UploadedMedia};
use vidtube_service::{configure_routes, AppState};

pub const JWT_SECRET: &str = "integration-test-secret-with-enough-entropy";
pub const BOUNDARY: &str = "----vidtube-test-boundary";

/// Media gateway double that hands out predictable URLs.
///
/// Calls numbered in `fail_on` (1-based) are rejected.
pub struct FakeGateway {
    calls: AtomicUsize,
    fail_on: Vec<usize>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::failing_on(Vec::new())
    }

    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaGateway for FakeGateway {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let exists = local_path.exists();
        let _ = tokio::fs::remove_file(local_path).await;

        if !exists {
            return Err(MediaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "staged file missing",
            )));
        }
        if self.fail_on.contains(&call) {
            return Err(MediaError::Rejected {
                status: 500,
                body: "fake failure".to_string(),
            });
        }

        Ok(UploadedMedia {
            url: format!("https://media.test/upload/{}", call),
            duration: Some(12.5),
        })
    }
}

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub media: Arc<FakeGateway>,
    pub upload_dir: TempDir,
    pub state: AppState,
    pub validator: Arc<JwtValidator>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_gateway(FakeGateway::new())
    }

    pub fn with_gateway(gateway: FakeGateway) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let media = Arc::new(gateway);
        let upload_dir = tempfile::tempdir().expect("create upload dir");

        let media_config = MediaConfig {
            upload_dir: upload_dir.path().to_path_buf(),
            max_upload_bytes: 1024 * 1024,
            ..MediaConfig::default()
        };

        let state = AppState {
            store: store.clone(),
            media: media.clone(),
            media_config,
            pagination: PaginationConfig::default(),
        };

        let validator = Arc::new(JwtValidator::new(&AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            jwt_issuer: None,
        }));

        Self {
            store,
            media,
            upload_dir,
            state,
            validator,
        }
    }

    pub async fn seed_user(&self, username: &str) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            fullname: format!("{} Fullname", username),
            avatar: format!("https://media.test/avatars/{}.png", username),
            created_at: Utc::now(),
        };
        self.store.upsert_user(&user).await.expect("seed user").id
    }

    pub async fn seed_video(&self, owner: Uuid, title: &str, published: bool) -> Uuid {
        let video = self
            .store
            .insert_video(NewVideo {
                owner_id: owner,
                title: title.to_string(),
                description: format!("{} description", title),
                video_url: format!("https://media.test/{}.mp4", title),
                thumbnail_url: format!("https://media.test/{}.png", title),
                duration: 30.0,
            })
            .await
            .expect("seed video");
        if published {
            self.store
                .set_video_published(video.id, true)
                .await
                .expect("publish video");
        }
        video.id
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub fn bearer(user_id: Uuid) -> (&'static str, String) {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        iss: None,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token");
    ("Authorization", format!("Bearer {}", token))
}

pub async fn init_app(
    ctx: &TestContext,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    let validator = ctx.validator.clone();
    test::init_service(
        App::new()
            .app_data(web::Data::new(ctx.state.clone()))
            .configure(move |cfg| configure_routes(cfg, validator)),
    )
    .await
}

/// Part of a multipart/form-data body
pub enum FormPart<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_body(parts: &[FormPart<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (
        format!("multipart/form-data; boundary={}", BOUNDARY),
        body,
    )
}

pub fn video_upload_parts<'a>(title: &'a str) -> Vec<FormPart<'a>> {
    vec![
        FormPart::Text("title", title),
        FormPart::Text("description", "uploaded in a test"),
        FormPart::File {
            name: "videoFile",
            file_name: "clip.mp4",
            content_type: "video/mp4",
            bytes: b"not really frames",
        },
        FormPart::File {
            name: "thumbnail",
            file_name: "thumb.png",
            content_type: "image/png",
            bytes: b"not really pixels",
        },
    ]
}
