use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Vod(#[from] vodl_engine::VodError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid time '{input}': {reason}")]
    InvalidTime { input: String, reason: String },

    #[error("Failed to read config file: {0}")]
    ConfigRead(#[from] toml::de::Error),

    #[error("Failed to write config file: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
