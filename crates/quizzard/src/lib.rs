//! `quizzard` - A role-gating quiz bot for Discord
//!
//! This library provides the core functionality for running multiple-choice
//! quizzes over DM, maintaining a question bank in SQLite, and assigning
//! roles based on quiz results.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod quiz;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use quiz::{Question, QuizSettings, QuizType};
pub use storage::Storage;
