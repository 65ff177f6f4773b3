use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),

    #[error("{service} responded with {status} for {url}")]
    Remote {
        service: &'static str,
        url: String,
        status: StatusCode,
    },

    #[error("Could not parse page: {0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Malformed Steam ID: {0}")]
    Format(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file is corrupted: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),

    #[error("Discord error: {0}")]
    Discord(Box<serenity::Error>),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::Discord(Box::new(err))
    }
}

impl AppError {
    /// Build a [`AppError::Remote`] from a non-200 response.
    pub fn remote(service: &'static str, url: impl Into<String>, status: StatusCode) -> Self {
        AppError::Remote {
            service,
            url: url.into(),
            status,
        }
    }

    /// HTTP status carried by a remote failure, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error stems from the request itself or from the data it
    /// points at, rather than from the bot's own plumbing.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Usage(_)
                | AppError::Remote { .. }
                | AppError::Parse(_)
                | AppError::NotFound(_)
                | AppError::Format(_)
        )
    }
}
