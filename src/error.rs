//! Error types for the zoo reporting layer.
//!
//! Defines the main error enum used throughout the application. The variants
//! follow the failure taxonomy the presentation adapters map to output:
//! infrastructure failures, missing rows, store-side rule rejections and
//! plain statement errors.

use std::fmt;
use thiserror::Error;

/// Store-side rule that refused a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionRule {
    /// The `InserirAnimal` stored procedure (e.g. unknown habitat).
    Procedure,
    /// The trigger guarding `Produto.quantidade`.
    Trigger,
}

impl RejectionRule {
    /// Returns the store object that owns the rule.
    pub fn source(&self) -> &'static str {
        match self {
            Self::Procedure => "procedure InserirAnimal",
            Self::Trigger => "trigger on Produto.quantidade",
        }
    }
}

impl fmt::Display for RejectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Main error type for catalog operations.
#[derive(Error, Debug)]
pub enum ZooError {
    /// The store cannot be reached (host unreachable, auth failed, pool closed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single-row lookup yielded no row.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A write refused by a procedure or trigger for a business reason.
    #[error("Rejected by {rule}: {message}")]
    Rejected {
        rule: RejectionRule,
        message: String,
    },

    /// Malformed or violating statements (duplicate keys, bad casts, etc.)
    #[error("Statement error: {0}")]
    Statement(String),

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (socket binding, unexpected states, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ZooError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a not-found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates a rejection raised by the given store-side rule.
    pub fn rejected(rule: RejectionRule, msg: impl Into<String>) -> Self {
        Self::Rejected {
            rule,
            message: msg.into(),
        }
    }

    /// Creates a statement error with the given message.
    pub fn statement(msg: impl Into<String>) -> Self {
        Self::Statement(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true for failures caused by infrastructure rather than input.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection(m)
            | Self::NotFound(m)
            | Self::Statement(m)
            | Self::Config(m)
            | Self::Internal(m) => m,
            Self::Rejected { message, .. } => message,
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::NotFound(_) => "Not Found",
            Self::Rejected { .. } => "Constraint Rejection",
            Self::Statement(_) => "Statement Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ZooError.
pub type Result<T> = std::result::Result<T, ZooError>;
