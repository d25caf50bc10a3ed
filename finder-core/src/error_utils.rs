use crate::error::*;
use tracing::{debug, error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("{}", self);
        match self {
            CoreError::FeedApi(e) => {
                error!(source = ?e, "feed service failure");
            }
            CoreError::Database(e) => {
                error!(source = ?e, "settings store failure");
            }
            CoreError::Config(e) => {
                error!(source = ?e, "configuration failure");
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("{} (continuing)", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::FeedApi(e) => e.is_retryable(),
            CoreError::Database(e) => e.is_retryable(),
            CoreError::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::FeedApi(e) => e.user_friendly_message(),
            CoreError::Database(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check that the services are running.".to_string()
            }
            CoreError::InvalidInput { .. } => {
                "That search could not be processed.".to_string()
            }
            CoreError::NotFound { resource } => format!("There is no {}.", resource),
            CoreError::Io(_) => "Could not read or write a local file.".to_string(),
            _ => "Something went wrong while preparing the leads.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::FeedApi(_) => "FEED_API".to_string(),
            CoreError::Database(_) => "DATABASE".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::NotFound { .. } => "NOT_FOUND".to_string(),
        }
    }
}

impl ErrorExt for FeedApiError {
    fn log_error(&self) -> &Self {
        error!("feed service: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("feed service: {} (continuing)", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedApiError::EndpointUnavailable { .. }
                | FeedApiError::RequestTimeout { .. }
                | FeedApiError::ServerError { .. }
        )
    }

    fn user_friendly_message(&self) -> String {
        match self {
            FeedApiError::EndpointUnavailable { endpoint } => {
                format!("Could not reach {}. Is the service running?", endpoint)
            }
            FeedApiError::RequestTimeout { .. } => {
                "The post service did not answer in time. Please try again.".to_string()
            }
            FeedApiError::InvalidResponse { .. } => {
                "The post service returned data in an unexpected format.".to_string()
            }
            FeedApiError::NotFound { .. } => "No posts were found for that request.".to_string(),
            FeedApiError::CircuitOpen { service } => format!(
                "{} is failing repeatedly. Showing local results for now.",
                service
            ),
            _ => "Post service error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            FeedApiError::EndpointUnavailable { .. } => "FEED_ENDPOINT_UNAVAILABLE".to_string(),
            FeedApiError::RequestTimeout { .. } => "FEED_TIMEOUT".to_string(),
            FeedApiError::InvalidResponse { .. } => "FEED_INVALID_RESPONSE".to_string(),
            FeedApiError::NotFound { .. } => "FEED_NOT_FOUND".to_string(),
            FeedApiError::ServerError { .. } => "FEED_SERVER_ERROR".to_string(),
            FeedApiError::ClientError { .. } => "FEED_CLIENT_ERROR".to_string(),
            FeedApiError::CircuitOpen { .. } => "FEED_CIRCUIT_OPEN".to_string(),
        }
    }
}

impl ErrorExt for DatabaseError {
    fn log_error(&self) -> &Self {
        error!("settings store: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("settings store: {} (continuing)", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(self, DatabaseError::ConnectionFailed { .. })
    }

    fn user_friendly_message(&self) -> String {
        match self {
            DatabaseError::NotConnected | DatabaseError::ConnectionFailed { .. } => {
                "Local storage is unavailable. Search history will not be saved.".to_string()
            }
            _ => "Local storage error occurred. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            DatabaseError::NotConnected => "DB_NOT_CONNECTED".to_string(),
            DatabaseError::ConnectionFailed { .. } => "DB_CONNECTION_FAILED".to_string(),
            DatabaseError::MigrationFailed { .. } => "DB_MIGRATION_FAILED".to_string(),
            DatabaseError::Sql(_) => "DB_SQL_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("configuration: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("configuration: {} (continuing)", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("No configuration at '{}'.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Setting '{}' has an unusable value.", field)
            }
            ConfigError::Parse(_) => {
                "The configuration file is not valid TOML.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!(code = %error.error_code(), "{}", error.user_friendly_message());
        }
    }

    /// Logs a failure the caller has already recovered from.
    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
            debug!(code = %error.error_code(), "recovered");
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
