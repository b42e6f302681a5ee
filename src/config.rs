use std::env;

/// Connection details for the S3-compatible object store that holds
/// attachment bytes, plus the public base URL used when building the
/// attachment links returned to clients.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Base of the publicly resolvable attachment URLs, without a trailing
    /// slash (e.g. "http://localhost:9000").
    pub public_url_base: String,
}

/// Process-wide configuration, read once at startup and passed to each
/// service at construction time. Business logic never reads the
/// environment directly.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Token signing secret. Kept optional so a missing secret surfaces as
    /// a runtime configuration error from the token service instead of a
    /// startup panic.
    pub jwt_secret: Option<String>,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").ok(),
            storage: StorageConfig {
                endpoint: env::var("S3_ENDPOINT")
                    .unwrap_or_else(|_| "http://127.0.0.1:9000".to_string()),
                region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "todo-app".to_string()),
                access_key: env::var("S3_ACCESS_KEY").unwrap_or_default(),
                secret_key: env::var("S3_SECRET_KEY").unwrap_or_default(),
                public_url_base: env::var("PUBLIC_URL_BASE")
                    .unwrap_or_else(|_| "http://127.0.0.1:9000".to_string()),
            },
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
