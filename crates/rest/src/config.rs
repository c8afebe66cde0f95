//! Server configuration for the SciFun REST API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SCIFUN_PORT` | 3000 | Server port |
//! | `SCIFUN_HOST` | 127.0.0.1 | Host to bind |
//! | `SCIFUN_LOG_LEVEL` | info | Log level |
//! | `SCIFUN_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `SCIFUN_ENABLE_CORS` | true | Enable CORS |
//! | `SCIFUN_CORS_ORIGINS` | http://localhost:3000 | Allowed origins |
//! | `JWT_SECRET` | (none) | HMAC secret for access tokens |
//! | `JWT_EXPIRES_SECS` | 3600 | Access token lifetime (seconds) |
//! | `MONGO_URI` | (none) | MongoDB connection string |
//! | `MONGO_DB` | scifun | MongoDB database name |
//! | `ELASTICSEARCH_NODE` | (none) | Elasticsearch node URL |
//! | `ELASTICSEARCH_API_KEY` | (none) | Encoded API key for the cluster |
//!
//! # Example
//!
//! ```rust
//! use scifun_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 8080,
//!     host: "0.0.0.0".to_string(),
//!     ..ServerConfig::default()
//! };
//! ```

use clap::Parser;

/// Server configuration for the SciFun REST API.
///
/// Constructed from environment variables with [`ServerConfig::from_env`],
/// from command line arguments with [`ServerConfig::parse`], or
/// programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "scifun-server")]
#[command(about = "SciFun quiz platform API server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "SCIFUN_PORT", default_value = "3000")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "SCIFUN_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "SCIFUN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "SCIFUN_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "SCIFUN_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "SCIFUN_CORS_ORIGINS", default_value = "http://localhost:3000")]
    pub cors_origins: String,

    /// HMAC secret used to sign and verify access tokens.
    #[arg(long, env = "JWT_SECRET", default_value = "")]
    pub jwt_secret: String,

    /// Access token lifetime in seconds.
    #[arg(long, env = "JWT_EXPIRES_SECS", default_value = "3600")]
    pub jwt_expires_secs: u64,

    /// MongoDB connection string.
    #[arg(long, env = "MONGO_URI")]
    pub mongo_uri: Option<String>,

    /// MongoDB database name.
    #[arg(long, env = "MONGO_DB", default_value = "scifun")]
    pub mongo_db: String,

    /// Elasticsearch node URL.
    #[arg(long, env = "ELASTICSEARCH_NODE")]
    pub elasticsearch_node: Option<String>,

    /// Encoded API key for the Elasticsearch cluster.
    #[arg(long, env = "ELASTICSEARCH_API_KEY")]
    pub elasticsearch_api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "http://localhost:3000".to_string(),
            jwt_secret: String::new(),
            jwt_expires_secs: 3600,
            mongo_uri: None,
            mongo_db: "scifun".to_string(),
            elasticsearch_node: None,
            elasticsearch_api_key: None,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// Convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.jwt_secret.is_empty() {
            errors.push("JWT_SECRET must be set".to_string());
        }

        if self.jwt_expires_secs == 0 {
            errors.push("Token lifetime cannot be 0".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_origins: "*".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expires_secs: 3600,
            mongo_uri: None,
            mongo_db: "scifun-test".to_string(),
            elasticsearch_node: None,
            elasticsearch_api_key: None,
        }
    }
}
