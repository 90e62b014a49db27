//! Storage layer for quizzard.
//!
//! This module provides `SQLite`-based persistent storage for managers,
//! quiz types and settings, the question bank, and attempt statistics.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::quiz::{
    Choice, Manager, NewQuestion, Question, QuizAggregate, QuizAttempt, QuizSettings, QuizType,
};

/// Settings supplied when creating a new quiz type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewQuizSettings {
    /// Number of questions drawn per attempt.
    pub length: usize,
    /// Minimum correct answers required to pass.
    pub min_correct: usize,
    /// Role a member must hold to start the quiz.
    pub required_role: u64,
    /// Role granted on passing.
    pub passing_role: u64,
    /// Optional second role granted on passing.
    pub passing_role_two: Option<u64>,
    /// Role granted on failing.
    pub non_passing_role: u64,
}

/// Storage engine for quiz data.
///
/// Wraps a single `SQLite` connection. Multi-statement operations
/// (quiz creation, question insertion and removal) run in transactions.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Managers ===

    /// Check whether a Discord user is a registered manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_manager(&self, discord_id: u64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM managers WHERE discord_id = ?1",
            [discord_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Add a new manager. Fails if the user is already a manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including on the
    /// unique constraint when the manager already exists.
    pub fn add_manager(&self, discord_id: u64, added_by: u64) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO managers (discord_id, added_by) VALUES (?1, ?2)",
            params![discord_id, added_by],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Added manager {} (row {})", discord_id, id);
        Ok(id)
    }

    /// Remove a manager.
    ///
    /// Returns `true` if a manager was removed, `false` if the user was not
    /// a manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_manager(&self, discord_id: u64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM managers WHERE discord_id = ?1", [discord_id])?;
        Ok(affected > 0)
    }

    /// List all managers, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_managers(&self) -> Result<Vec<Manager>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, discord_id, added_at, added_by FROM managers ORDER BY id")?;

        let managers = stmt
            .query_map([], |row| {
                Ok(Manager {
                    id: row.get(0)?,
                    discord_id: row.get(1)?,
                    added_at: epoch_to_datetime(row.get(2)?),
                    added_by: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(managers)
    }

    // === Quiz types and settings ===

    /// Look up a quiz type id by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn quiz_id(&self, slug: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT id FROM quiz_types WHERE slug = ?1", [slug], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    /// Check whether a quiz type exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn quiz_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.quiz_id(slug)?.is_some())
    }

    /// List all quiz types.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_quizzes(&self) -> Result<Vec<QuizType>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, slug FROM quiz_types ORDER BY id")?;

        let quizzes = stmt
            .query_map([], |row| {
                Ok(QuizType {
                    id: row.get(0)?,
                    slug: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(quizzes)
    }

    /// Create a quiz type and its settings in one transaction.
    ///
    /// Returns the new quiz type's id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including on the
    /// unique constraint when the slug already exists.
    pub fn add_quiz(&mut self, slug: &str, settings: &NewQuizSettings) -> Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute("INSERT INTO quiz_types (slug) VALUES (?1)", [slug])?;
        let quiz_id = tx.last_insert_rowid();

        tx.execute(
            r"
            INSERT INTO quiz_settings
                (quiz_type, length, min_correct, required_role, passing_role, passing_role_two, non_passing_role)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                quiz_id,
                settings.length,
                settings.min_correct,
                settings.required_role,
                settings.passing_role,
                settings.passing_role_two,
                settings.non_passing_role,
            ],
        )?;

        tx.commit()?;
        info!("Added quiz type '{}' (id {})", slug, quiz_id);
        Ok(quiz_id)
    }

    /// Remove a quiz type and its settings.
    ///
    /// Questions in the bank keep their rows; a recreated quiz with the same
    /// id would see them again, matching the original deployment's
    /// behaviour.
    ///
    /// Returns `true` if the quiz type existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_quiz(&mut self, slug: &str) -> Result<bool> {
        let Some(quiz_id) = self.quiz_id(slug)? else {
            return Ok(false);
        };

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM quiz_settings WHERE quiz_type = ?1", [quiz_id])?;
        tx.execute("DELETE FROM quiz_types WHERE id = ?1", [quiz_id])?;
        tx.commit()?;

        info!("Removed quiz type '{}'", slug);
        Ok(true)
    }

    /// Load the settings for a quiz by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn quiz_settings(&self, slug: &str) -> Result<Option<QuizSettings>> {
        let settings = self
            .conn
            .query_row(
                r"
                SELECT qt.id, qs.length, qs.min_correct, qs.required_role,
                       qs.passing_role, qs.passing_role_two, qs.non_passing_role
                FROM quiz_settings AS qs
                JOIN quiz_types AS qt ON qs.quiz_type = qt.id
                WHERE qt.slug = ?1
                ",
                [slug],
                |row| {
                    Ok(QuizSettings {
                        quiz_id: row.get(0)?,
                        length: row.get(1)?,
                        min_correct: row.get(2)?,
                        required_role: row.get(3)?,
                        passing_role: row.get(4)?,
                        passing_role_two: row.get(5)?,
                        non_passing_role: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(settings)
    }

    /// Update a quiz's length setting.
    ///
    /// Returns `true` if a settings row was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_quiz_length(&self, slug: &str, length: usize) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE quiz_settings SET length = ?1
            WHERE quiz_type = (SELECT id FROM quiz_types WHERE slug = ?2)
            ",
            params![length, slug],
        )?;
        Ok(affected > 0)
    }

    /// Update a quiz's minimum correct setting.
    ///
    /// Returns `true` if a settings row was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_quiz_min_correct(&self, slug: &str, min_correct: usize) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE quiz_settings SET min_correct = ?1
            WHERE quiz_type = (SELECT id FROM quiz_types WHERE slug = ?2)
            ",
            params![min_correct, slug],
        )?;
        Ok(affected > 0)
    }

    // === Question bank ===

    /// Insert a question with its choices in one transaction.
    ///
    /// Returns the new question's id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_question(
        &mut self,
        quiz_id: i64,
        created_by: u64,
        question: &NewQuestion,
    ) -> Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            r"
            INSERT INTO quiz_question_bank
                (question_text, correct_answer_text, incorrect_answer_text, image, quiz_type, created_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                question.text,
                question.correct_answer_text,
                question.incorrect_answer_text,
                question.image,
                quiz_id,
                created_by,
            ],
        )?;
        let question_id = tx.last_insert_rowid();

        for choice in &question.choices {
            tx.execute(
                "INSERT INTO quiz_choice_bank (question_id, choice_text, is_correct) VALUES (?1, ?2, ?3)",
                params![question_id, choice.text, choice.is_correct],
            )?;
        }

        tx.commit()?;
        debug!("Inserted question {} with {} choices", question_id, question.choices.len());
        Ok(question_id)
    }

    /// Remove a question and its choices.
    ///
    /// Returns `true` if the question existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_question(&mut self, question_id: i64) -> Result<bool> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM quiz_choice_bank WHERE question_id = ?1",
            [question_id],
        )?;
        let affected = tx.execute(
            "DELETE FROM quiz_question_bank WHERE id = ?1",
            [question_id],
        )?;
        tx.commit()?;
        Ok(affected > 0)
    }

    /// Check whether a question exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn question_exists(&self, question_id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM quiz_question_bank WHERE id = ?1",
            [question_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Load all questions for a quiz, with their choices.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn questions_for_quiz(&self, quiz_id: i64) -> Result<Vec<Question>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, question_text, correct_answer_text, incorrect_answer_text,
                   image, quiz_type, created_by, created_at
            FROM quiz_question_bank
            WHERE quiz_type = ?1
            ORDER BY id
            ",
        )?;

        let mut questions = stmt
            .query_map([quiz_id], |row| {
                Ok(Question {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    correct_answer_text: row.get(2)?,
                    incorrect_answer_text: row.get(3)?,
                    image: row.get(4)?,
                    quiz_id: row.get(5)?,
                    created_by: row.get(6)?,
                    created_at: epoch_to_datetime(row.get(7)?),
                    choices: Vec::new(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for question in &mut questions {
            question.choices = self.choices_for_question(question.id)?;
        }

        Ok(questions)
    }

    /// Load the choices for one question, in insertion order.
    fn choices_for_question(&self, question_id: i64) -> Result<Vec<Choice>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, choice_text, is_correct FROM quiz_choice_bank WHERE question_id = ?1 ORDER BY id",
        )?;

        let choices = stmt
            .query_map([question_id], |row| {
                Ok(Choice {
                    id: Some(row.get(0)?),
                    text: row.get(1)?,
                    is_correct: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(choices)
    }

    // === Statistics ===

    /// Record the result of one graded question.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_question_attempt(
        &self,
        discord_id: u64,
        question_id: i64,
        correct: bool,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO question_stats (discord_id, question_id, correct) VALUES (?1, ?2, ?3)",
            params![discord_id, question_id, correct],
        )?;
        Ok(())
    }

    /// Record a finished quiz attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_quiz_attempt(&self, discord_id: u64, quiz_id: i64, passed: bool) -> Result<()> {
        self.conn.execute(
            "INSERT INTO quiz_stats (discord_id, quiz_type, passed) VALUES (?1, ?2, ?3)",
            params![discord_id, quiz_id, passed],
        )?;
        Ok(())
    }

    /// List a user's quiz attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn attempts_for_user(&self, discord_id: u64) -> Result<Vec<QuizAttempt>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT qs.passed, qs.timestamp, qt.slug
            FROM quiz_stats AS qs
            JOIN quiz_types AS qt ON qs.quiz_type = qt.id
            WHERE qs.discord_id = ?1
            ORDER BY qs.timestamp DESC
            ",
        )?;

        let attempts = stmt
            .query_map([discord_id], |row| {
                Ok(QuizAttempt {
                    passed: row.get(0)?,
                    timestamp: epoch_to_datetime(row.get(1)?),
                    quiz_slug: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(attempts)
    }

    /// Aggregate statistics for one quiz type, alongside the totals across
    /// all quiz types.
    ///
    /// Returns `None` when the quiz has no recorded attempts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn quiz_aggregate(&self, quiz_id: i64) -> Result<Option<QuizAggregate>> {
        let aggregate = self
            .conn
            .query_row(
                r"
                WITH total_stats AS (
                    SELECT COUNT(*) AS total_rows,
                           CAST(SUM(CASE WHEN passed THEN 1 ELSE 0 END) AS FLOAT) / COUNT(*) AS total_pass_ratio
                    FROM quiz_stats
                ),
                per_quiz AS (
                    SELECT quiz_type,
                           COUNT(*) AS attempts,
                           CAST(SUM(CASE WHEN passed THEN 1 ELSE 0 END) AS FLOAT) / COUNT(*) AS pass_ratio,
                           MIN(timestamp) AS oldest_attempt,
                           MAX(timestamp) AS newest_attempt
                    FROM quiz_stats
                    GROUP BY quiz_type
                )
                SELECT ts.total_rows, ts.total_pass_ratio,
                       pq.attempts, pq.pass_ratio, pq.oldest_attempt, pq.newest_attempt
                FROM total_stats AS ts
                LEFT JOIN per_quiz AS pq ON 1 = 1
                WHERE pq.quiz_type = ?1
                ",
                [quiz_id],
                |row| {
                    Ok(QuizAggregate {
                        total_attempts: row.get(0)?,
                        total_pass_ratio: row.get(1)?,
                        attempts: row.get(2)?,
                        pass_ratio: row.get(3)?,
                        oldest_attempt: epoch_to_datetime(row.get(4)?),
                        newest_attempt: epoch_to_datetime(row.get(5)?),
                    })
                },
            )
            .optional()?;

        Ok(aggregate)
    }
}

/// Delete the database file along with its `-wal` and `-shm` siblings.
///
/// Returns the number of files removed. Missing files are skipped.
///
/// # Errors
///
/// Returns an error if an existing file cannot be removed.
pub fn remove_database(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let mut removed = 0;

    let mut targets = vec![path.to_path_buf()];
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        targets.push(path.with_file_name(format!("{name}-wal")));
        targets.push(path.with_file_name(format!("{name}-shm")));
    }

    for target in targets {
        if target.exists() {
            std::fs::remove_file(&target)?;
            info!("Removed {}", target.display());
            removed += 1;
        }
    }

    Ok(removed)
}

/// Convert a unixepoch column value to a `DateTime<Utc>`.
fn epoch_to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::parse_correct_answers;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn test_settings() -> NewQuizSettings {
        NewQuizSettings {
            length: 3,
            min_correct: 2,
            required_role: 100,
            passing_role: 200,
            passing_role_two: None,
            non_passing_role: 300,
        }
    }

    fn test_question(n: usize) -> NewQuestion {
        NewQuestion::from_parts(
            format!("Question {n}"),
            "Right!",
            "Wrong!",
            None,
            &[Some("a"), Some("b"), Some("c"), None, None],
            &parse_correct_answers("1"),
        )
        .unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_manager_lifecycle() {
        let storage = create_test_storage();

        assert!(!storage.is_manager(1).unwrap());
        storage.add_manager(1, 99).unwrap();
        assert!(storage.is_manager(1).unwrap());

        assert!(storage.remove_manager(1).unwrap());
        assert!(!storage.is_manager(1).unwrap());
    }

    #[test]
    fn test_add_manager_duplicate_fails() {
        let storage = create_test_storage();
        storage.add_manager(1, 99).unwrap();
        assert!(storage.add_manager(1, 99).is_err());
    }

    #[test]
    fn test_remove_manager_missing() {
        let storage = create_test_storage();
        assert!(!storage.remove_manager(42).unwrap());
    }

    #[test]
    fn test_list_managers() {
        let storage = create_test_storage();
        storage.add_manager(10, 1).unwrap();
        storage.add_manager(20, 1).unwrap();

        let managers = storage.list_managers().unwrap();
        assert_eq!(managers.len(), 2);
        assert_eq!(managers[0].discord_id, 10);
        assert_eq!(managers[0].added_by, 1);
        assert_eq!(managers[1].discord_id, 20);
    }

    #[test]
    fn test_add_quiz_and_settings() {
        let mut storage = create_test_storage();
        let quiz_id = storage.add_quiz("rust-basics", &test_settings()).unwrap();

        assert!(storage.quiz_exists("rust-basics").unwrap());
        assert_eq!(storage.quiz_id("rust-basics").unwrap(), Some(quiz_id));

        let settings = storage.quiz_settings("rust-basics").unwrap().unwrap();
        assert_eq!(settings.quiz_id, quiz_id);
        assert_eq!(settings.length, 3);
        assert_eq!(settings.min_correct, 2);
        assert_eq!(settings.required_role, 100);
        assert_eq!(settings.passing_role_two, None);
    }

    #[test]
    fn test_add_quiz_duplicate_slug_fails() {
        let mut storage = create_test_storage();
        storage.add_quiz("dup", &test_settings()).unwrap();
        assert!(storage.add_quiz("dup", &test_settings()).is_err());
    }

    #[test]
    fn test_add_quiz_second_passing_role() {
        let mut storage = create_test_storage();
        let mut settings = test_settings();
        settings.passing_role_two = Some(250);
        storage.add_quiz("double", &settings).unwrap();

        let loaded = storage.quiz_settings("double").unwrap().unwrap();
        assert_eq!(loaded.passing_role_two, Some(250));
    }

    #[test]
    fn test_remove_quiz() {
        let mut storage = create_test_storage();
        storage.add_quiz("temp", &test_settings()).unwrap();

        assert!(storage.remove_quiz("temp").unwrap());
        assert!(!storage.quiz_exists("temp").unwrap());
        assert!(storage.quiz_settings("temp").unwrap().is_none());
    }

    #[test]
    fn test_remove_quiz_missing() {
        let mut storage = create_test_storage();
        assert!(!storage.remove_quiz("ghost").unwrap());
    }

    #[test]
    fn test_list_quizzes() {
        let mut storage = create_test_storage();
        assert!(storage.list_quizzes().unwrap().is_empty());

        storage.add_quiz("one", &test_settings()).unwrap();
        storage.add_quiz("two", &test_settings()).unwrap();

        let quizzes = storage.list_quizzes().unwrap();
        assert_eq!(quizzes.len(), 2);
        assert_eq!(quizzes[0].slug, "one");
        assert_eq!(quizzes[1].slug, "two");
    }

    #[test]
    fn test_edit_quiz_settings() {
        let mut storage = create_test_storage();
        storage.add_quiz("edit-me", &test_settings()).unwrap();

        assert!(storage.set_quiz_length("edit-me", 10).unwrap());
        assert!(storage.set_quiz_min_correct("edit-me", 8).unwrap());

        let settings = storage.quiz_settings("edit-me").unwrap().unwrap();
        assert_eq!(settings.length, 10);
        assert_eq!(settings.min_correct, 8);
    }

    #[test]
    fn test_edit_quiz_settings_missing_quiz() {
        let storage = create_test_storage();
        assert!(!storage.set_quiz_length("ghost", 10).unwrap());
        assert!(!storage.set_quiz_min_correct("ghost", 8).unwrap());
    }

    #[test]
    fn test_add_question_with_choices() {
        let mut storage = create_test_storage();
        let quiz_id = storage.add_quiz("q", &test_settings()).unwrap();

        let question_id = storage.add_question(quiz_id, 7, &test_question(1)).unwrap();
        assert!(storage.question_exists(question_id).unwrap());

        let questions = storage.questions_for_quiz(quiz_id).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Question 1");
        assert_eq!(questions[0].created_by, 7);
        assert_eq!(questions[0].choices.len(), 3);
        assert!(questions[0].choices[0].is_correct);
        assert!(!questions[0].choices[1].is_correct);
    }

    #[test]
    fn test_remove_question_cascades_choices() {
        let mut storage = create_test_storage();
        let quiz_id = storage.add_quiz("q", &test_settings()).unwrap();
        let question_id = storage.add_question(quiz_id, 7, &test_question(1)).unwrap();

        assert!(storage.remove_question(question_id).unwrap());
        assert!(!storage.question_exists(question_id).unwrap());

        let orphans: i64 = storage
            .conn
            .query_row(
                "SELECT COUNT(*) FROM quiz_choice_bank WHERE question_id = ?1",
                [question_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_remove_question_missing() {
        let mut storage = create_test_storage();
        assert!(!storage.remove_question(999).unwrap());
    }

    #[test]
    fn test_questions_for_quiz_filters_by_quiz() {
        let mut storage = create_test_storage();
        let quiz_a = storage.add_quiz("a", &test_settings()).unwrap();
        let quiz_b = storage.add_quiz("b", &test_settings()).unwrap();

        storage.add_question(quiz_a, 1, &test_question(1)).unwrap();
        storage.add_question(quiz_a, 1, &test_question(2)).unwrap();
        storage.add_question(quiz_b, 1, &test_question(3)).unwrap();

        assert_eq!(storage.questions_for_quiz(quiz_a).unwrap().len(), 2);
        assert_eq!(storage.questions_for_quiz(quiz_b).unwrap().len(), 1);
    }

    #[test]
    fn test_record_and_list_quiz_attempts() {
        let mut storage = create_test_storage();
        let quiz_id = storage.add_quiz("hist", &test_settings()).unwrap();

        storage.record_quiz_attempt(5, quiz_id, true).unwrap();
        storage.record_quiz_attempt(5, quiz_id, false).unwrap();
        storage.record_quiz_attempt(6, quiz_id, true).unwrap();

        let attempts = storage.attempts_for_user(5).unwrap();
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().all(|a| a.quiz_slug == "hist"));
    }

    #[test]
    fn test_attempts_for_user_empty() {
        let storage = create_test_storage();
        assert!(storage.attempts_for_user(5).unwrap().is_empty());
    }

    #[test]
    fn test_record_question_attempt() {
        let mut storage = create_test_storage();
        let quiz_id = storage.add_quiz("q", &test_settings()).unwrap();
        let question_id = storage.add_question(quiz_id, 1, &test_question(1)).unwrap();

        storage.record_question_attempt(5, question_id, true).unwrap();

        let count: i64 = storage
            .conn
            .query_row("SELECT COUNT(*) FROM question_stats", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_quiz_aggregate_math() {
        let mut storage = create_test_storage();
        let quiz_a = storage.add_quiz("a", &test_settings()).unwrap();
        let quiz_b = storage.add_quiz("b", &test_settings()).unwrap();

        // quiz a: 3 attempts, 2 passed; quiz b: 1 attempt, 0 passed
        storage.record_quiz_attempt(1, quiz_a, true).unwrap();
        storage.record_quiz_attempt(2, quiz_a, true).unwrap();
        storage.record_quiz_attempt(3, quiz_a, false).unwrap();
        storage.record_quiz_attempt(4, quiz_b, false).unwrap();

        let agg = storage.quiz_aggregate(quiz_a).unwrap().unwrap();
        assert_eq!(agg.total_attempts, 4);
        assert!((agg.total_pass_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(agg.attempts, 3);
        assert!((agg.pass_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert!(agg.newest_attempt >= agg.oldest_attempt);
    }

    #[test]
    fn test_quiz_aggregate_no_attempts() {
        let mut storage = create_test_storage();
        let quiz_id = storage.add_quiz("quiet", &test_settings()).unwrap();
        assert!(storage.quiz_aggregate(quiz_id).unwrap().is_none());
    }

    #[test]
    fn test_open_file_based() {
        let temp_dir = std::env::temp_dir();
        let db_path = temp_dir.join(format!("quizzard_test_{}.db", std::process::id()));

        let storage = Storage::open(&db_path).unwrap();
        storage.add_manager(1, 2).unwrap();
        assert!(storage.is_manager(1).unwrap());
        assert_eq!(storage.path(), db_path);

        drop(storage);
        let removed = remove_database(&db_path).unwrap();
        assert!(removed >= 1);
        assert!(!db_path.exists());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = std::env::temp_dir();
        let nested_path = temp_dir.join(format!(
            "quizzard_test_{}/nested/db.sqlite",
            std::process::id()
        ));

        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(storage);
        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent.parent().unwrap());
        }
    }

    #[test]
    fn test_remove_database_missing_files() {
        let path = std::env::temp_dir().join("quizzard_never_created.db");
        assert_eq!(remove_database(&path).unwrap(), 0);
    }
}
