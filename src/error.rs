// src/error.rs

//! Unified error handling for the function adapter.

use std::fmt;

use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// Every variant is built where the failure happens, so the kind and the
/// human-readable detail never have to be guessed from a message later.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Route registration failed
    #[error("Route registration error: {0}")]
    Registration(String),

    /// Inbound event could not be turned into an HTTP request
    #[error("Invalid request for {context}: {message}")]
    Request { context: String, message: String },

    /// Application response could not be turned into a host response
    #[error("Invalid response: {0}")]
    Response(String),

    /// Application code panicked while handling a request
    #[error("Handler panicked: {0}")]
    Handler(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a route registration error.
    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration(message.into())
    }

    /// Create a request translation error with context.
    pub fn request(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Request {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a response translation error.
    pub fn response(message: impl fmt::Display) -> Self {
        Self::Response(message.to_string())
    }

    /// Stable machine-readable kind, reported in failure envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Registration(_) => "registration",
            Self::Request { .. } => "request",
            Self::Response(_) => "response",
            Self::Handler(_) => "handler",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Toml(_) => "toml",
        }
    }

    /// Human-readable detail without the display prefix.
    pub fn detail(&self) -> String {
        match self {
            Self::Config(message)
            | Self::Registration(message)
            | Self::Response(message)
            | Self::Handler(message) => message.clone(),
            Self::Request { context, message } => format!("{context}: {message}"),
            Self::Io(e) => e.to_string(),
            Self::Json(e) => e.to_string(),
            Self::Toml(e) => e.to_string(),
        }
    }
}
