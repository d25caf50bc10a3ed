use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Feed API error: {0}")]
    FeedApi(#[from] FeedApiError),

    #[error("Settings store error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("File access failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP transport failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rejected input: {message}")]
    InvalidInput { message: String },

    #[error("No such {resource}")]
    NotFound { resource: String },
}

#[derive(Error, Debug, Clone)]
pub enum FeedApiError {
    #[error("Cannot reach {endpoint}")]
    EndpointUnavailable { endpoint: String },

    #[error("Request timeout for {endpoint}")]
    RequestTimeout { endpoint: String },

    #[error("Invalid API response from {endpoint}: {details}")]
    InvalidResponse { endpoint: String, details: String },

    #[error("Resource not found: {endpoint}")]
    NotFound { endpoint: String },

    #[error("Server error {status_code} from {endpoint}")]
    ServerError { endpoint: String, status_code: u16 },

    #[error("Request rejected with {status_code} by {endpoint}")]
    ClientError { endpoint: String, status_code: u16 },

    #[error("Circuit breaker open for {service}")]
    CircuitOpen { service: String },
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database is not connected")]
    NotConnected,

    #[error("Cannot open settings store: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Schema setup failed: {migration}")]
    MigrationFailed { migration: String },

    #[error("sqlite: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file missing: {path}")]
    FileNotFound { path: String },

    #[error("Bad value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
