//! Error types for quizzard.
//!
//! This module defines all error types used throughout the quizzard crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for quizzard operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// No bot token was configured.
    #[error("no bot token configured: set DISCORD_BOT_TOKEN or [discord] token")]
    MissingToken,

    /// No guild identifier was configured.
    #[error("no guild configured: set GUILD_ID or [discord] guild_id")]
    MissingGuild,

    // === Quiz Errors ===
    /// The question bank is too small to fill a quiz.
    #[error("not enough questions in the bank: have {available}, need {needed}")]
    NotEnoughQuestions {
        /// Questions available in the bank.
        available: usize,
        /// Questions required by the quiz settings.
        needed: usize,
    },

    /// The user already has a quiz in progress.
    #[error("user {user_id} already has an active quiz")]
    SessionActive {
        /// The Discord user id.
        user_id: u64,
    },

    /// A submitted question was rejected at validation.
    #[error("invalid question: {message}")]
    InvalidQuestion {
        /// Description of the validation failure.
        message: String,
    },

    // === Discord Errors ===
    /// A Discord API call failed.
    #[error("discord error: {0}")]
    Discord(#[from] serenity::Error),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for quizzard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a question validation error.
    #[must_use]
    pub fn invalid_question(message: impl Into<String>) -> Self {
        Self::InvalidQuestion {
            message: message.into(),
        }
    }
}
