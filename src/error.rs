use miette::{Diagnostic, Result};
use std::fmt;
use thiserror::Error;

/// A single user-correctable problem with one input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Name of the offending field ("title", "date", ...)
    pub field: &'static str,
    /// Human-readable reason
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collection of per-field validation problems
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationIssues(pub Vec<FieldIssue>);

impl ValidationIssues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem with a field
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldIssue::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All issues recorded for a given field
    #[allow(dead_code)]
    pub fn for_field(&self, field: &str) -> Vec<&FieldIssue> {
        self.0.iter().filter(|i| i.field == field).collect()
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Validation failed: {0}")]
    #[diagnostic(code(muistutin::validation))]
    Validation(ValidationIssues),

    #[error("No event with id {0}")]
    #[diagnostic(code(muistutin::not_found))]
    NotFound(String),

    #[error("Invalid date: {0}")]
    #[diagnostic(code(muistutin::invalid_date))]
    InvalidDate(String),

    #[error("Storage error: {0}")]
    #[diagnostic(code(muistutin::persistence))]
    Persistence(String),

    #[error("Notification error: {0}")]
    #[diagnostic(code(muistutin::notification))]
    Notification(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(muistutin::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(muistutin::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(muistutin::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(muistutin::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(muistutin::other))]
    Other(String),
}

impl Error {
    /// The per-field issues when this is a validation error
    #[allow(dead_code)]
    pub fn validation_issues(&self) -> Option<&ValidationIssues> {
        match self {
            Error::Validation(issues) => Some(issues),
            _ => None,
        }
    }
}

// Implement From for TOML serialization errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for JSON errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(message: &str) -> Error {
    Error::Environment(message.to_string())
}

/// Helper to create configuration errors
#[allow(dead_code)]
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create storage errors
pub fn persistence_error(message: &str) -> Error {
    Error::Persistence(message.to_string())
}

/// Helper to create notification errors
pub fn notification_error(message: &str) -> Error {
    Error::Notification(message.to_string())
}

/// Helper to create invalid-date errors
pub fn invalid_date_error(message: &str) -> Error {
    Error::InvalidDate(message.to_string())
}

/// Helper to create other errors
#[allow(dead_code)]
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
