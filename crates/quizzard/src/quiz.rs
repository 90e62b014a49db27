//! Core quiz domain types.
//!
//! This module defines the data structures for quizzes, questions, choices,
//! managers, and attempt statistics, along with validation for new questions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The minimum number of choices a question must carry.
pub const MIN_CHOICES: usize = 2;

/// The maximum number of choices a question may carry.
pub const MAX_CHOICES: usize = 5;

/// Letter label for a choice index (0 -> 'A', 1 -> 'B', ...).
///
/// # Panics
///
/// Panics if `idx` is not below [`MAX_CHOICES`].
#[must_use]
pub fn choice_letter(idx: usize) -> char {
    assert!(idx < MAX_CHOICES, "choice index out of range: {idx}");
    char::from(b'A' + u8::try_from(idx).unwrap_or(0))
}

/// A registered quiz type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizType {
    /// Database id.
    pub id: i64,
    /// The quiz's unique slug, e.g. `rust-basics`.
    pub slug: String,
}

/// Settings governing one quiz type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    /// Database id of the quiz type these settings belong to.
    pub quiz_id: i64,
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

impl QuizSettings {
    /// The passing grade as a fraction in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn passing_grade(&self) -> f64 {
        if self.length == 0 {
            return 0.0;
        }
        self.min_correct as f64 / self.length as f64
    }
}

/// One answer choice belonging to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Database id (None until inserted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// The choice text shown to quiz takers.
    pub text: String,
    /// Whether this choice is part of the correct answer set.
    pub is_correct: bool,
}

impl Choice {
    /// Create a choice that has not been stored yet.
    #[must_use]
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: None,
            text: text.into(),
            is_correct,
        }
    }
}

/// A question in a quiz's bank, with its choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Database id.
    pub id: i64,
    /// The question text.
    pub text: String,
    /// Feedback shown when answered correctly.
    pub correct_answer_text: String,
    /// Feedback shown when answered incorrectly.
    pub incorrect_answer_text: String,
    /// Optional image URL displayed with the question.
    pub image: Option<String>,
    /// Database id of the quiz type this question belongs to.
    pub quiz_id: i64,
    /// Discord id of the manager who created the question.
    pub created_by: u64,
    /// When the question was created.
    pub created_at: DateTime<Utc>,
    /// The answer choices, in insertion order.
    pub choices: Vec<Choice>,
}

impl Question {
    /// Number of correct choices.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.choices.iter().filter(|c| c.is_correct).count()
    }

    /// Whether exactly one choice is correct.
    #[must_use]
    pub fn is_single_answer(&self) -> bool {
        self.correct_count() == 1
    }
}

/// A question submitted by a manager, validated before insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    /// The question text.
    pub text: String,
    /// Feedback shown when answered correctly.
    pub correct_answer_text: String,
    /// Feedback shown when answered incorrectly.
    pub incorrect_answer_text: String,
    /// Optional image URL.
    pub image: Option<String>,
    /// The answer choices.
    pub choices: Vec<Choice>,
}

impl NewQuestion {
    /// Build a new question from the raw command arguments.
    ///
    /// `answers` holds up to five optional answer texts; `correct` marks
    /// which positions are correct (see [`parse_correct_answers`]). Gaps in
    /// `answers` are skipped, so the stored choices are dense.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuestion`] when no choice is marked correct,
    /// when a correct mark points at an empty answer slot, or when fewer
    /// than [`MIN_CHOICES`] answers are supplied.
    pub fn from_parts(
        text: impl Into<String>,
        correct_answer_text: impl Into<String>,
        incorrect_answer_text: impl Into<String>,
        image: Option<String>,
        answers: &[Option<&str>; MAX_CHOICES],
        correct: &[bool; MAX_CHOICES],
    ) -> Result<Self> {
        if !correct.contains(&true) {
            return Err(Error::invalid_question(
                "at least one choice must be marked correct",
            ));
        }

        for (idx, (answer, &is_correct)) in answers.iter().zip(correct.iter()).enumerate() {
            if is_correct && answer.is_none() {
                return Err(Error::invalid_question(format!(
                    "answer {} is marked correct but has no text",
                    idx + 1
                )));
            }
        }

        let choices: Vec<Choice> = answers
            .iter()
            .zip(correct.iter())
            .filter_map(|(answer, &is_correct)| {
                answer.map(|text| Choice::new(text, is_correct))
            })
            .collect();

        if choices.len() < MIN_CHOICES {
            return Err(Error::invalid_question(format!(
                "a question needs at least {MIN_CHOICES} choices"
            )));
        }

        Ok(Self {
            text: text.into(),
            correct_answer_text: correct_answer_text.into(),
            incorrect_answer_text: incorrect_answer_text.into(),
            image,
            choices,
        })
    }
}

/// Parse the manager-supplied correct-answer digits.
///
/// The argument is an unordered string of digits 1-5, e.g. `"31"` marks the
/// first and third answers correct. Characters outside `1..=5` are ignored,
/// matching the forgiving behaviour quiz managers rely on.
#[must_use]
pub fn parse_correct_answers(argument: &str) -> [bool; MAX_CHOICES] {
    let mut correct = [false; MAX_CHOICES];
    for ch in argument.chars() {
        if let Some(digit) = ch.to_digit(10) {
            let digit = digit as usize;
            if (1..=MAX_CHOICES).contains(&digit) {
                correct[digit - 1] = true;
            }
        }
    }
    correct
}

/// A bot manager row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    /// Database id.
    pub id: i64,
    /// The manager's Discord id.
    pub discord_id: u64,
    /// When the manager was added.
    pub added_at: DateTime<Utc>,
    /// Discord id of whoever added them.
    pub added_by: u64,
}

/// One recorded quiz attempt for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAttempt {
    /// Whether the attempt passed.
    pub passed: bool,
    /// When the attempt finished.
    pub timestamp: DateTime<Utc>,
    /// Slug of the quiz that was attempted.
    pub quiz_slug: String,
}

/// Aggregate statistics for one quiz type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAggregate {
    /// Attempts recorded across all quiz types.
    pub total_attempts: i64,
    /// Pass ratio across all quiz types.
    pub total_pass_ratio: f64,
    /// Attempts recorded for this quiz type.
    pub attempts: i64,
    /// Pass ratio for this quiz type.
    pub pass_ratio: f64,
    /// Oldest attempt for this quiz type.
    pub oldest_attempt: DateTime<Utc>,
    /// Newest attempt for this quiz type.
    pub newest_attempt: DateTime<Utc>,
}
