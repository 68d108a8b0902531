/// Configuration management for VidTube Service
///
/// Loaded once from environment variables at startup (after `.env` is read)
/// and handed to the collaborators that need it. Nothing mutates it afterwards.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Entity store configuration
    pub database: DatabaseConfig,
    /// Bearer token validation
    pub auth: AuthConfig,
    /// Media upload gateway
    pub media: MediaConfig,
    /// Listing page sizes
    pub pagination: PaginationConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Emit JSON log lines instead of plain text
    pub json_logs: bool,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Server-side bound on every statement, in milliseconds
    pub statement_timeout_ms: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 shared secret
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Local staging directory for multipart uploads
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub upload_timeout_secs: u64,
}

impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .finish()
    }
}

impl MediaConfig {
    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            upload_dir: PathBuf::from("./public/temp"),
            max_upload_bytes: 100 * 1024 * 1024,
            upload_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                other => return Err(format!("Unknown STORE_BACKEND '{}'", other)),
            },
            Err(_) => StoreBackend::Postgres,
        };
        if production && backend == StoreBackend::Memory {
            return Err("STORE_BACKEND=memory is not allowed in production".to_string());
        }

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;
        if jwt_secret.trim().is_empty() {
            return Err("JWT_SECRET cannot be empty".to_string());
        }

        let media_defaults = MediaConfig::default();
        let pagination_defaults = PaginationConfig::default();

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("APP_PORT", 8000)?,
                json_logs: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                backend,
                url: match std::env::var("DATABASE_URL") {
                    Ok(url) => url,
                    Err(_) if backend == StoreBackend::Postgres => {
                        return Err("DATABASE_URL must be set for the postgres store".to_string())
                    }
                    Err(_) => String::new(),
                },
                max_connections: parse_env_or_default("DB_MAX_CONNECTIONS", 20)?,
                statement_timeout_ms: parse_env_or_default("DB_STATEMENT_TIMEOUT_MS", 5_000)?,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_issuer: std::env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty()),
            },
            media: MediaConfig {
                cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
                api_key: std::env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
                api_secret: std::env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
                upload_dir: std::env::var("MEDIA_UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(media_defaults.upload_dir),
                max_upload_bytes: parse_env_or_default(
                    "MEDIA_MAX_UPLOAD_BYTES",
                    media_defaults.max_upload_bytes,
                )?,
                upload_timeout_secs: parse_env_or_default(
                    "MEDIA_UPLOAD_TIMEOUT_SECS",
                    media_defaults.upload_timeout_secs,
                )?,
            },
            pagination: {
                let default_limit =
                    parse_env_or_default("PAGE_DEFAULT_LIMIT", pagination_defaults.default_limit)?;
                let max_limit =
                    parse_env_or_default("PAGE_MAX_LIMIT", pagination_defaults.max_limit)?;
                if default_limit == 0 || default_limit > max_limit {
                    return Err(format!(
                        "PAGE_DEFAULT_LIMIT must be between 1 and {}",
                        max_limit
                    ));
                }
                PaginationConfig {
                    default_limit,
                    max_limit,
                }
            },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_or_default_falls_back() {
        std::env::remove_var("VIDTUBE_TEST_UNSET_PORT");
        let port: u16 = parse_env_or_default("VIDTUBE_TEST_UNSET_PORT", 8000).unwrap();
        assert_eq!(port, 8000);
    }

    #[test]
    fn parse_env_or_default_rejects_garbage() {
        std::env::set_var("VIDTUBE_TEST_BAD_PORT", "eighty");
        let result: Result<u16, String> = parse_env_or_default("VIDTUBE_TEST_BAD_PORT", 8000);
        assert!(result.is_err());
        std::env::remove_var("VIDTUBE_TEST_BAD_PORT");
    }

    #[test]
    fn media_debug_redacts_secret() {
        let media = MediaConfig {
            api_secret: "shh".to_string(),
            ..MediaConfig::default()
        };
        assert!(!format!("{:?}", media).contains("shh"));
        assert!(!media.is_configured());
    }
}
