use std::time::Duration;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {var}")]
    MissingEnv { var: &'static str },

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("dial failed: {0}")]
    Dial(String),

    #[error("connection aborted")]
    ConnectionAborted,

    #[error("stream rejected with status {status}: {body}")]
    StreamRejected { status: u16, body: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("broker error: {0}")]
    Broker(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("match channel closed")]
    ChannelClosed,

    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
