use crate::error::*;
use tracing::{error, warn};

pub const VALIDATION_MESSAGE: &str =
    "Invalid search parameters. Please check your input and try again.";

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;

    /// True for failures of the remote content source, the only errors that
    /// may be absorbed by a stale cache fallback.
    fn is_fetch_failure(&self) -> bool;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Analysis(e) => {
                error!("Analysis error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Analysis(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::Validation { .. } => VALIDATION_MESSAGE.to_string(),
            CoreError::ServiceUnavailable { message } => message.clone(),
            CoreError::Cancelled { .. } => "The request was cancelled.".to_string(),
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::Analysis(_) => "ANALYSIS".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::Validation { .. } => "VALIDATION".to_string(),
            CoreError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE".to_string(),
            CoreError::Cancelled { .. } => "CANCELLED".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }

    fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            CoreError::RedditApi(_) | CoreError::Network(_) | CoreError::Serialization(_)
        )
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RedditApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. You may not have permission to view this content.",
                resource
            ),
            RedditApiError::NotFound { .. } => {
                "The requested content could not be found.".to_string()
            }
            RedditApiError::HttpStatus {
                status_code,
                message,
            } => format!("Reddit API returned {}: {}", status_code, message),
            RedditApiError::RequestTimeout => {
                "Request to Reddit timed out. Please try again.".to_string()
            }
            _ => "Reddit API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::NotFound { .. } => "REDDIT_NOT_FOUND".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
            RedditApiError::HttpStatus { .. } => "REDDIT_HTTP_STATUS".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
        }
    }

    fn is_fetch_failure(&self) -> bool {
        true
    }
}

impl ErrorExt for AnalysisError {
    fn log_error(&self) -> &Self {
        error!("AnalysisError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("AnalysisError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            AnalysisError::EmptyInput => "There are no comments to analyze.".to_string(),
            AnalysisError::NoComments { .. } => {
                "This post has no comments long enough to analyze.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            AnalysisError::EmptyInput => "ANALYSIS_EMPTY_INPUT".to_string(),
            AnalysisError::NoComments { .. } => "ANALYSIS_NO_COMMENTS".to_string(),
        }
    }

    fn is_fetch_failure(&self) -> bool {
        false
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => format!(
                "Configuration file '{}' not found. Please check the path.",
                path
            ),
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::Parse(_) => {
                "Configuration file could not be parsed. Please check its syntax.".to_string()
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

    fn is_fetch_failure(&self) -> bool {
        false
    }
}
