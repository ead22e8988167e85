//! Configuration for the blog GraphQL service
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)
//!
//! The JWT secret is read once here and handed to the token service; nothing
//! mutates it afterwards.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Image upload configuration
    pub upload: UploadConfig,

    /// GraphQL configuration
    pub graphql: GraphQLConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma separated origins, `*` for any
    pub cors_allowed_origins: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_seconds: i64,
}

// Keeps the secret out of logs.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Root directory under which the `images/` folder lives
    pub root_dir: PathBuf,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Enable GraphiQL at GET /graphql
    pub playground: bool,
    /// Max query depth
    pub max_depth: usize,
    /// Max query complexity
    pub max_complexity: usize,
    /// Enable introspection
    pub introspection: bool,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            playground: true,
            max_depth: 10,
            max_complexity: 1000,
            introspection: true,
        }
    }
}

impl Config {
    /// Load configuration from the environment (and `.env` when present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_or("SERVER_PORT", 8080)?,
                cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string()),
            },
            jwt: Self::jwt_from_env()?,
            upload: UploadConfig {
                root_dir: env::var("UPLOAD_ROOT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(".")),
                max_bytes: parse_or("UPLOAD_MAX_BYTES", 20 * 1024 * 1024)?,
            },
            graphql: GraphQLConfig {
                playground: parse_or("GRAPHQL_PLAYGROUND", true)?,
                max_depth: parse_or("GRAPHQL_MAX_DEPTH", 10)?,
                max_complexity: parse_or("GRAPHQL_MAX_COMPLEXITY", 1000)?,
                introspection: parse_or("GRAPHQL_INTROSPECTION", true)?,
            },
        })
    }

    /// Load JWT configuration from environment variables
    fn jwt_from_env() -> Result<JwtConfig> {
        let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.len() < crypto_core::jwt::MIN_SECRET_LENGTH {
            bail!(
                "JWT_SECRET must be at least {} bytes",
                crypto_core::jwt::MIN_SECRET_LENGTH
            );
        }

        let expiry_seconds = env::var("JWT_EXPIRY_SECONDS")
            .unwrap_or_else(|_| crypto_core::jwt::DEFAULT_EXPIRY_SECONDS.to_string())
            .parse()
            .context("Invalid JWT_EXPIRY_SECONDS")?;

        Ok(JwtConfig {
            secret,
            expiry_seconds,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
