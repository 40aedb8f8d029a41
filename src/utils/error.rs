use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Render timed out after {seconds}s")]
    RenderTimeout { seconds: u64 },

    #[error("Notification error: {notifier}: {message}")]
    Notification { notifier: String, message: String },
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
