//! `SQLite` schema definitions for quizzard.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the managers table.
pub const CREATE_MANAGERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS managers (
    id INTEGER PRIMARY KEY,
    discord_id INTEGER UNIQUE NOT NULL,
    added_at INTEGER NOT NULL DEFAULT (unixepoch('now')),
    added_by INTEGER NOT NULL
)
";

/// SQL statement to create the quiz types table.
pub const CREATE_QUIZ_TYPES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS quiz_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT UNIQUE NOT NULL
)
";

/// SQL statement to create the per-quiz settings table.
///
/// `passing_role_two` is nullable; a quiz may award one or two roles.
pub const CREATE_QUIZ_SETTINGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS quiz_settings (
    id INTEGER PRIMARY KEY,
    quiz_type INTEGER UNIQUE NOT NULL,
    length INTEGER NOT NULL,
    min_correct INTEGER NOT NULL,
    required_role INTEGER NOT NULL,
    passing_role INTEGER NOT NULL,
    passing_role_two INTEGER,
    non_passing_role INTEGER NOT NULL,
    FOREIGN KEY (quiz_type) REFERENCES quiz_types(id)
)
";

/// SQL statement to create the question bank table.
pub const CREATE_QUESTION_BANK_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS quiz_question_bank (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_text TEXT NOT NULL,
    correct_answer_text TEXT NOT NULL,
    incorrect_answer_text TEXT NOT NULL,
    image TEXT,
    quiz_type INTEGER NOT NULL,
    created_by INTEGER NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (unixepoch('now')),
    FOREIGN KEY (quiz_type) REFERENCES quiz_types(id)
)
";

/// SQL statement to create the choice bank table.
pub const CREATE_CHOICE_BANK_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS quiz_choice_bank (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id INTEGER NOT NULL,
    choice_text TEXT NOT NULL,
    is_correct BOOLEAN NOT NULL,
    FOREIGN KEY (question_id) REFERENCES quiz_question_bank(id)
)
";

/// SQL statement to create the per-attempt quiz statistics table.
pub const CREATE_QUIZ_STATS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS quiz_stats (
    id INTEGER PRIMARY KEY,
    discord_id INTEGER NOT NULL,
    quiz_type INTEGER NOT NULL,
    passed BOOLEAN NOT NULL,
    timestamp INTEGER NOT NULL DEFAULT (unixepoch('now'))
)
";

/// SQL statement to create the per-question statistics table.
pub const CREATE_QUESTION_STATS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS question_stats (
    id INTEGER PRIMARY KEY,
    discord_id INTEGER NOT NULL,
    question_id INTEGER NOT NULL,
    correct BOOLEAN NOT NULL,
    timestamp INTEGER NOT NULL DEFAULT (unixepoch('now'))
)
";

/// SQL statement to create an index on question quiz type for bank listings.
pub const CREATE_QUESTION_QUIZ_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_question_bank_quiz ON quiz_question_bank(quiz_type)
";

/// SQL statement to create an index on choice question id.
pub const CREATE_CHOICE_QUESTION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_choice_bank_question ON quiz_choice_bank(question_id)
";

/// SQL statement to create an index on quiz stats by user.
pub const CREATE_QUIZ_STATS_USER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_quiz_stats_user ON quiz_stats(discord_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_MANAGERS_TABLE,
    CREATE_QUIZ_TYPES_TABLE,
    CREATE_QUIZ_SETTINGS_TABLE,
    CREATE_QUESTION_BANK_TABLE,
    CREATE_CHOICE_BANK_TABLE,
    CREATE_QUIZ_STATS_TABLE,
    CREATE_QUESTION_STATS_TABLE,
    CREATE_QUESTION_QUIZ_INDEX,
    CREATE_CHOICE_QUESTION_INDEX,
    CREATE_QUIZ_STATS_USER_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_settings_second_passing_role_is_nullable() {
        assert!(CREATE_QUIZ_SETTINGS_TABLE.contains("passing_role_two INTEGER,"));
    }

    #[test]
    fn test_question_bank_contains_required_columns() {
        assert!(CREATE_QUESTION_BANK_TABLE.contains("question_text TEXT NOT NULL"));
        assert!(CREATE_QUESTION_BANK_TABLE.contains("correct_answer_text TEXT NOT NULL"));
        assert!(CREATE_QUESTION_BANK_TABLE.contains("incorrect_answer_text TEXT NOT NULL"));
        assert!(CREATE_QUESTION_BANK_TABLE.contains("created_by INTEGER NOT NULL"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
