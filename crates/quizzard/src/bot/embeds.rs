//! Embed construction helpers.
//!
//! Result and error embeds share one look across every command, and the
//! question-bank listing is chunked into pages here so the pagination rules
//! stay testable without a gateway connection.

use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter};

use crate::quiz::{choice_letter, Question};

/// Discord caps embed descriptions at 4096 characters; stay under it with
/// some slack for the page footer.
pub const MAX_PAGE_LENGTH: usize = 4000;

/// Colour for success and neutral informational embeds.
pub const COLOUR_OK: Colour = Colour::DARK_GREEN;

/// Colour for failure feedback that is not an error.
pub const COLOUR_WARN: Colour = Colour::ORANGE;

/// Colour for error embeds.
pub const COLOUR_ERROR: Colour = Colour::RED;

/// A green informational embed.
pub fn normal(description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new().description(description).colour(COLOUR_OK)
}

/// A red error embed.
pub fn error(description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .description(description)
        .colour(COLOUR_ERROR)
}

/// A titled embed in the given colour.
pub fn titled(title: impl Into<String>, description: impl Into<String>, colour: Colour) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(colour)
}

/// The embed shown for one quiz question.
pub fn question_embed(question: &Question, number: usize, total: usize) -> CreateEmbed {
    let mut description = format!("{}\n\n", question.text);
    for (idx, choice) in question.choices.iter().enumerate() {
        description.push_str(&format!("**{}.** {}\n", choice_letter(idx), choice.text));
    }

    let mut embed = CreateEmbed::new()
        .title(format!("Question {number}/{total}"))
        .description(description)
        .colour(COLOUR_OK);

    if let Some(image) = &question.image {
        embed = embed.image(image);
    }

    if !question.is_single_answer() {
        embed = embed.footer(CreateEmbedFooter::new("Multiple answers may be correct."));
    }

    embed
}

/// Render one question for the manager-facing bank listing.
///
/// Correct choices are bolded so managers can review the answer key at a
/// glance.
pub fn format_question(question: &Question) -> String {
    let mut entry = format!("**#{}** {}\n", question.id, question.text);

    for (idx, choice) in question.choices.iter().enumerate() {
        if choice.is_correct {
            entry.push_str(&format!("> **{}. {}**\n", choice_letter(idx), choice.text));
        } else {
            entry.push_str(&format!("> {}. {}\n", choice_letter(idx), choice.text));
        }
    }

    entry.push_str(&format!(
        "> Added by <@{}> on {}\n",
        question.created_by,
        question.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    if let Some(image) = &question.image {
        entry.push_str(&format!("> Image: {image}\n"));
    }

    entry.push_str(&format!(
        "> On correct: {}\n> On incorrect: {}\n",
        question.correct_answer_text, question.incorrect_answer_text
    ));

    entry
}

/// Chunk a question listing into page descriptions.
///
/// A page holds at most `per_page` questions and at most [`MAX_PAGE_LENGTH`]
/// characters. An oversized single question gets a page of its own, truncated
/// to the limit so the embed description stays under Discord's cap.
#[must_use]
pub fn paginate_questions(questions: &[Question], per_page: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for question in questions {
        let mut entry = format_question(question);
        if entry.len() > MAX_PAGE_LENGTH {
            let mut cut = MAX_PAGE_LENGTH - '…'.len_utf8();
            while !entry.is_char_boundary(cut) {
                cut -= 1;
            }
            entry.truncate(cut);
            entry.push('…');
        }
        let fits = count < per_page && current.len() + entry.len() + 1 <= MAX_PAGE_LENGTH;

        if !current.is_empty() && !fits {
            pages.push(current);
            current = String::new();
            count = 0;
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&entry);
        count += 1;
    }

    if !current.is_empty() {
        pages.push(current);
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Choice;
    use chrono::Utc;

    fn question_with_text(id: i64, text: &str) -> Question {
        Question {
            id,
            text: text.to_string(),
            correct_answer_text: "Right!".to_string(),
            incorrect_answer_text: "Wrong!".to_string(),
            image: None,
            quiz_id: 1,
            created_by: 42,
            created_at: Utc::now(),
            choices: vec![Choice::new("yes", true), Choice::new("no", false)],
        }
    }

    #[test]
    fn test_format_question_bolds_correct_choices() {
        let rendered = format_question(&question_with_text(7, "Is water wet?"));
        assert!(rendered.contains("**#7** Is water wet?"));
        assert!(rendered.contains("**A. yes**"));
        assert!(rendered.contains("> B. no"));
        assert!(rendered.contains("<@42>"));
    }

    #[test]
    fn test_format_question_includes_image() {
        let mut question = question_with_text(1, "q");
        question.image = Some("https://example.com/a.png".to_string());
        let rendered = format_question(&question);
        assert!(rendered.contains("Image: https://example.com/a.png"));
    }

    #[test]
    fn test_paginate_empty() {
        assert!(paginate_questions(&[], 5).is_empty());
    }

    #[test]
    fn test_paginate_by_count() {
        let questions: Vec<Question> = (1..=12)
            .map(|i| question_with_text(i, "short question"))
            .collect();

        let pages = paginate_questions(&questions, 5);
        assert_eq!(pages.len(), 3);
        // 5 + 5 + 2 questions
        assert_eq!(pages[0].matches("**#").count(), 5);
        assert_eq!(pages[2].matches("**#").count(), 2);
    }

    #[test]
    fn test_paginate_by_length() {
        let long_text = "x".repeat(1500);
        let questions: Vec<Question> = (1..=5)
            .map(|i| question_with_text(i, &long_text))
            .collect();

        let pages = paginate_questions(&questions, 5);
        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.len() <= MAX_PAGE_LENGTH);
        }
    }

    #[test]
    fn test_paginate_oversized_question_gets_own_page() {
        let huge = "x".repeat(MAX_PAGE_LENGTH + 100);
        let questions = vec![question_with_text(1, &huge), question_with_text(2, "tiny")];

        let pages = paginate_questions(&questions, 5);
        assert_eq!(pages.len(), 2);
        for page in &pages {
            assert!(page.len() <= MAX_PAGE_LENGTH);
        }
    }

    #[test]
    fn test_paginate_truncates_oversized_question() {
        let huge = "é".repeat(MAX_PAGE_LENGTH);
        let pages = paginate_questions(&[question_with_text(1, &huge)], 5);

        assert_eq!(pages.len(), 1);
        assert!(pages[0].len() <= MAX_PAGE_LENGTH);
        assert!(pages[0].ends_with('…'));
    }

    #[test]
    fn test_question_embed_builds() {
        let question = question_with_text(1, "q");
        // Builder output is opaque; constructing it must not panic.
        let _ = question_embed(&question, 1, 3);
    }
}
