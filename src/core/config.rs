use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub change_stream: ChangeStreamConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Token authorizer configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// JSON Web Key Set endpoint of the identity provider
    pub jwks_url: String,
    /// Timeout for a single key set fetch
    pub jwks_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// S3-compatible storage configuration for equipment attachments
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3/MinIO endpoint URL
    pub endpoint: String,
    /// Endpoint used when building attachment URLs handed to clients
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Bucket holding one object per equipment, keyed by equipment id
    pub bucket: String,
    pub region: String,
    /// Presigned upload URL expiry time in seconds
    pub presigned_url_expiry_secs: u32,
    /// Shared secret expected on bucket event notifications (disabled when unset)
    pub webhook_token: Option<String>,
}

/// Change log draining configuration
#[derive(Debug, Clone)]
pub struct ChangeStreamConfig {
    pub poll_interval: Duration,
    pub batch_size: i64,
    /// How long a claimed but unacknowledged change stays hidden from other drainers
    pub claim_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            change_stream: ChangeStreamConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    /// Auth0 tenant of the "Equipment Status App" application
    pub const DEFAULT_JWKS_URL: &'static str =
        "https://dev-i9zmlvbg.us.auth0.com/.well-known/jwks.json";
    const DEFAULT_JWKS_TIMEOUT_SECS: u64 = 5;

    pub fn from_env() -> Result<Self, String> {
        let jwks_url =
            env::var("AUTH_JWKS_URL").unwrap_or_else(|_| Self::DEFAULT_JWKS_URL.to_string());

        let jwks_timeout_secs = env::var("AUTH_JWKS_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_JWKS_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "AUTH_JWKS_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            jwks_url,
            jwks_timeout: Duration::from_secs(jwks_timeout_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Equipment Status API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for the equipment status service".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u32 = 300; // 5 minutes

    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        // Public endpoint defaults to the main endpoint if not specified
        let public_endpoint =
            env::var("STORAGE_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        let access_key =
            env::var("STORAGE_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key =
            env::var("STORAGE_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("ATTACHMENT_BUCKET")
            .unwrap_or_else(|_| "equipment-attachments".to_string());

        let region = env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let presigned_url_expiry_secs = env::var("STORAGE_PRESIGNED_URL_EXPIRY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_PRESIGNED_URL_EXPIRY_SECS.to_string())
            .parse::<u32>()
            .map_err(|_| "STORAGE_PRESIGNED_URL_EXPIRY_SECS must be a valid number".to_string())?;

        let webhook_token = env::var("STORAGE_WEBHOOK_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            presigned_url_expiry_secs,
            webhook_token,
        })
    }
}

impl ChangeStreamConfig {
    const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
    const DEFAULT_BATCH_SIZE: i64 = 100;
    const DEFAULT_CLAIM_TIMEOUT_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let poll_interval_ms = env::var("CHANGE_STREAM_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| Self::DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "CHANGE_STREAM_POLL_INTERVAL_MS must be a valid number".to_string())?;

        let batch_size = env::var("CHANGE_STREAM_BATCH_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_BATCH_SIZE.to_string())
            .parse::<i64>()
            .map_err(|_| "CHANGE_STREAM_BATCH_SIZE must be a valid number".to_string())?;

        if batch_size < 1 {
            return Err("CHANGE_STREAM_BATCH_SIZE must be at least 1".to_string());
        }

        let claim_timeout_secs = env::var("CHANGE_STREAM_CLAIM_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_CLAIM_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "CHANGE_STREAM_CLAIM_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
            batch_size,
            claim_timeout: Duration::from_secs(claim_timeout_secs),
        })
    }
}
