//! Quiz session mechanics.
//!
//! The pure parts of running a quiz live here: drawing a random question
//! set, tracking a taker's selections on one question, exact-match grading,
//! and the one-active-quiz-per-user registry. The Discord delivery layer in
//! [`crate::bot`] drives these types.

use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

use rand::seq::SliceRandom;

use crate::error::{Error, Result};
use crate::quiz::Question;

/// Draw `count` distinct questions uniformly at random from the bank.
///
/// # Errors
///
/// Returns [`Error::NotEnoughQuestions`] when the bank holds fewer than
/// `count` questions.
pub fn draw_questions(mut bank: Vec<Question>, count: usize) -> Result<Vec<Question>> {
    if bank.len() < count {
        return Err(Error::NotEnoughQuestions {
            available: bank.len(),
            needed: count,
        });
    }

    bank.shuffle(&mut rand::thread_rng());
    bank.truncate(count);
    Ok(bank)
}

/// The taker's working selection on one question.
///
/// Single-answer questions replace the selection on every press;
/// multi-answer questions toggle individual choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheet {
    selected: BTreeSet<usize>,
    single_answer: bool,
}

impl AnswerSheet {
    /// Create a sheet for a question.
    #[must_use]
    pub fn new(question: &Question) -> Self {
        Self {
            selected: BTreeSet::new(),
            single_answer: question.is_single_answer(),
        }
    }

    /// Register a press on the choice at `idx`.
    pub fn press(&mut self, idx: usize) {
        if self.single_answer {
            self.selected.clear();
            self.selected.insert(idx);
        } else if !self.selected.remove(&idx) {
            self.selected.insert(idx);
        }
    }

    /// Whether the choice at `idx` is currently selected.
    #[must_use]
    pub fn is_selected(&self, idx: usize) -> bool {
        self.selected.contains(&idx)
    }

    /// Whether nothing is selected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Grade the sheet against the question.
    ///
    /// Correct iff the selected set equals the correct set exactly: every
    /// correct choice selected, no incorrect choice selected.
    #[must_use]
    pub fn grade(&self, question: &Question) -> bool {
        question
            .choices
            .iter()
            .enumerate()
            .all(|(idx, choice)| self.selected.contains(&idx) == choice.is_correct)
    }
}

/// Final outcome of one quiz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    /// Questions answered correctly.
    pub correct: usize,
    /// Questions asked.
    pub total: usize,
    /// Minimum correct answers required to pass.
    pub min_correct: usize,
}

impl QuizOutcome {
    /// Whether the taker passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.correct >= self.min_correct
    }
}

/// Registry enforcing at most one active quiz per user.
///
/// Interior mutability keeps the bot handler shareable; the mutex is a plain
/// std mutex since sections are short and never held across awaits.
#[derive(Debug, Default)]
pub struct ActiveSessions {
    users: Mutex<HashSet<u64>>,
}

impl ActiveSessions {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a session slot for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionActive`] when the user already holds a slot.
    pub fn begin(&self, user_id: u64) -> Result<()> {
        let mut users = self.users.lock().expect("session registry poisoned");
        if users.insert(user_id) {
            Ok(())
        } else {
            Err(Error::SessionActive { user_id })
        }
    }

    /// Release the session slot for `user_id`. Releasing a slot that was
    /// never claimed is a no-op.
    pub fn end(&self, user_id: u64) {
        let mut users = self.users.lock().expect("session registry poisoned");
        users.remove(&user_id);
    }

    /// Whether `user_id` currently holds a slot.
    #[must_use]
    pub fn is_active(&self, user_id: u64) -> bool {
        let users = self.users.lock().expect("session registry poisoned");
        users.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Choice;
    use chrono::Utc;

    fn question(choices: Vec<Choice>) -> Question {
        Question {
            id: 1,
            text: "q".to_string(),
            correct_answer_text: "right".to_string(),
            incorrect_answer_text: "wrong".to_string(),
            image: None,
            quiz_id: 1,
            created_by: 1,
            created_at: Utc::now(),
            choices,
        }
    }

    fn bank(size: usize) -> Vec<Question> {
        (0..size)
            .map(|i| {
                let mut q = question(vec![Choice::new("a", true), Choice::new("b", false)]);
                q.id = i64::try_from(i).unwrap();
                q
            })
            .collect()
    }

    #[test]
    fn test_draw_questions_exact_size() {
        let drawn = draw_questions(bank(10), 10).unwrap();
        assert_eq!(drawn.len(), 10);
    }

    #[test]
    fn test_draw_questions_subset_is_distinct() {
        let drawn = draw_questions(bank(10), 4).unwrap();
        assert_eq!(drawn.len(), 4);

        let ids: BTreeSet<i64> = drawn.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_draw_questions_not_enough() {
        let result = draw_questions(bank(3), 5);
        assert!(matches!(
            result,
            Err(Error::NotEnoughQuestions {
                available: 3,
                needed: 5
            })
        ));
    }

    #[test]
    fn test_single_answer_press_replaces() {
        let q = question(vec![
            Choice::new("a", true),
            Choice::new("b", false),
            Choice::new("c", false),
        ]);
        let mut sheet = AnswerSheet::new(&q);

        sheet.press(1);
        assert!(sheet.is_selected(1));

        sheet.press(0);
        assert!(sheet.is_selected(0));
        assert!(!sheet.is_selected(1));
    }

    #[test]
    fn test_multi_answer_press_toggles() {
        let q = question(vec![
            Choice::new("a", true),
            Choice::new("b", true),
            Choice::new("c", false),
        ]);
        let mut sheet = AnswerSheet::new(&q);

        sheet.press(0);
        sheet.press(1);
        assert!(sheet.is_selected(0));
        assert!(sheet.is_selected(1));

        sheet.press(0);
        assert!(!sheet.is_selected(0));
        assert!(sheet.is_selected(1));
    }

    #[test]
    fn test_grade_exact_match_passes() {
        let q = question(vec![
            Choice::new("a", true),
            Choice::new("b", true),
            Choice::new("c", false),
        ]);
        let mut sheet = AnswerSheet::new(&q);
        sheet.press(0);
        sheet.press(1);
        assert!(sheet.grade(&q));
    }

    #[test]
    fn test_grade_missing_correct_fails() {
        let q = question(vec![
            Choice::new("a", true),
            Choice::new("b", true),
            Choice::new("c", false),
        ]);
        let mut sheet = AnswerSheet::new(&q);
        sheet.press(0);
        assert!(!sheet.grade(&q));
    }

    #[test]
    fn test_grade_extra_incorrect_fails() {
        let q = question(vec![
            Choice::new("a", true),
            Choice::new("b", true),
            Choice::new("c", false),
        ]);
        let mut sheet = AnswerSheet::new(&q);
        sheet.press(0);
        sheet.press(1);
        sheet.press(2);
        assert!(!sheet.grade(&q));
    }

    #[test]
    fn test_grade_empty_sheet_fails() {
        let q = question(vec![Choice::new("a", true), Choice::new("b", false)]);
        let sheet = AnswerSheet::new(&q);
        assert!(sheet.is_empty());
        assert!(!sheet.grade(&q));
    }

    #[test]
    fn test_outcome_pass_boundary() {
        let exactly = QuizOutcome {
            correct: 7,
            total: 10,
            min_correct: 7,
        };
        assert!(exactly.passed());

        let under = QuizOutcome {
            correct: 6,
            total: 10,
            min_correct: 7,
        };
        assert!(!under.passed());
    }

    #[test]
    fn test_active_sessions_single_slot() {
        let sessions = ActiveSessions::new();

        assert!(sessions.begin(1).is_ok());
        assert!(sessions.is_active(1));
        assert!(matches!(
            sessions.begin(1),
            Err(Error::SessionActive { user_id: 1 })
        ));

        sessions.end(1);
        assert!(!sessions.is_active(1));
        assert!(sessions.begin(1).is_ok());
    }

    #[test]
    fn test_active_sessions_independent_users() {
        let sessions = ActiveSessions::new();
        assert!(sessions.begin(1).is_ok());
        assert!(sessions.begin(2).is_ok());
        sessions.end(1);
        assert!(sessions.is_active(2));
    }

    #[test]
    fn test_active_sessions_end_unknown_user() {
        let sessions = ActiveSessions::new();
        sessions.end(42);
        assert!(!sessions.is_active(42));
    }
}
