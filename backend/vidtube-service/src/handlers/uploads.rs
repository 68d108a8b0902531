/// Multipart intake for video endpoints
///
/// File parts are streamed into the staging directory; text parts are kept in
/// memory. Staged files are removed when their guard drops, so a request that
/// fails half-way never leaves files behind.
use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::error::{AppError, Result};

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// A file written to the staging directory
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        // Normally already consumed by the media gateway
        let _ = std::fs::remove_file(&self.path);
    }
}

#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, StagedFile>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<StagedFile> {
        self.files.remove(name)
    }
}

/// Media family a file part must belong to
fn expected_kind(name: &str) -> Option<mime::Name<'static>> {
    match name {
        "videoFile" => Some(mime::VIDEO),
        "thumbnail" => Some(mime::IMAGE),
        _ => None,
    }
}

fn check_content_type(
    name: &str,
    expected: mime::Name<'static>,
    content_type: Option<&mime::Mime>,
) -> Result<()> {
    match content_type {
        Some(ct) if ct.type_() != expected && *ct != mime::APPLICATION_OCTET_STREAM => {
            Err(AppError::InvalidArgument(format!(
                "{} must be a {} file, got {}",
                name, expected, ct
            )))
        }
        _ => Ok(()),
    }
}

/// Keep a client file name safe to use as a path component
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

fn multipart_error(err: impl std::fmt::Display) -> AppError {
    AppError::InvalidArgument(format!("Invalid multipart payload: {}", err))
}

/// Drain a multipart payload into text fields and staged files
pub async fn read_upload_form(mut payload: Multipart, config: &MediaConfig) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        let name = field
            .name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidArgument("Multipart field without a name".into()))?;

        if let Some(expected) = expected_kind(&name) {
            check_content_type(&name, expected, field.content_type())?;

            let original = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(sanitize_file_name)
                .unwrap_or_else(|| name.clone());

            tokio::fs::create_dir_all(&config.upload_dir).await?;
            let staged = StagedFile {
                path: config
                    .upload_dir
                    .join(format!("{}-{}", Uuid::new_v4(), original)),
            };
            let mut file = tokio::fs::File::create(staged.path()).await?;

            let mut written = 0usize;
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(multipart_error)?;
                written += chunk.len();
                if written > config.max_upload_bytes {
                    return Err(AppError::InvalidArgument(format!(
                        "{} exceeds the {} byte upload limit",
                        name, config.max_upload_bytes
                    )));
                }
                file.write_all(&chunk).await?;
            }
            file.flush().await?;

            if written == 0 {
                return Err(AppError::InvalidArgument(format!("{} is empty", name)));
            }
            tracing::debug!(field = %name, bytes = written, "staged upload");
            form.files.insert(name, staged);
        } else {
            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(multipart_error)?;
                if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
                    return Err(AppError::InvalidArgument(format!("{} is too long", name)));
                }
                bytes.extend_from_slice(&chunk);
            }
            let value = String::from_utf8(bytes)
                .map_err(|_| AppError::InvalidArgument(format!("{} must be UTF-8 text", name)))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
