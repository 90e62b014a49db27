//! The `/quiz start` flow.
//!
//! A quiz runs entirely over DM: each question is one message with lettered
//! choice buttons and a Submit button. Grading demands the selected set equal
//! the correct set exactly, and every graded question is recorded before the
//! final pass/fail verdict assigns roles.

use serenity::all::{
    ButtonStyle, ChannelId, CommandInteraction, Context, CreateActionRow, CreateButton,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage, EditMessage,
    GuildId, RoleId, UserId,
};
use tracing::{debug, info, warn};

use super::{embeds, followup_embed, split_subcommand, str_option, Handler};
use crate::error::{Error, Result};
use crate::quiz::{choice_letter, Question, QuizSettings};
use crate::session::{draw_questions, AnswerSheet, QuizOutcome};

pub(crate) async fn handle(handler: &Handler, ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
    let options = cmd.data.options();
    let Some(("start", subs)) = split_subcommand(&options) else {
        return Ok(());
    };
    let Some(slug) = str_option(subs, "quiz") else {
        return Ok(());
    };

    // Everything after this answers through followups.
    cmd.create_response(
        &ctx.http,
        CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new().ephemeral(true)),
    )
    .await?;

    let Some(guild_id) = cmd.guild_id else {
        return followup_embed(
            ctx,
            cmd,
            embeds::error("Start quizzes from inside the server."),
            true,
        )
        .await;
    };

    let settings = {
        let storage = handler.storage.lock().await;
        storage.quiz_settings(slug)?
    };
    let Some(settings) = settings else {
        return followup_embed(
            ctx,
            cmd,
            embeds::error(format!("No quiz named `{slug}` exists.")),
            true,
        )
        .await;
    };

    let member = guild_id.member(&ctx.http, cmd.user.id).await?;
    if !member.roles.contains(&RoleId::new(settings.required_role)) {
        return followup_embed(
            ctx,
            cmd,
            embeds::error(format!(
                "You need the <@&{}> role to take this quiz.",
                settings.required_role
            )),
            true,
        )
        .await;
    }

    let user_id = cmd.user.id.get();
    if let Err(Error::SessionActive { .. }) = handler.sessions.begin(user_id) {
        return followup_embed(
            ctx,
            cmd,
            embeds::error("You already have a quiz in progress. Finish it first."),
            true,
        )
        .await;
    }

    // The session slot must be released on every path out of the quiz.
    let result = run_session(handler, ctx, cmd, guild_id, &settings, slug).await;
    handler.sessions.end(user_id);
    result
}

async fn run_session(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    guild_id: GuildId,
    settings: &QuizSettings,
    slug: &str,
) -> Result<()> {
    let user_id = cmd.user.id.get();

    let dm = match cmd.user.create_dm_channel(&ctx.http).await {
        Ok(channel) => channel.id,
        Err(e) => {
            debug!("Could not open DM channel for {user_id}: {e}");
            return followup_embed(
                ctx,
                cmd,
                embeds::error("I couldn't DM you. Allow direct messages from server members and try again."),
                true,
            )
            .await;
        }
    };

    let bank = {
        let storage = handler.storage.lock().await;
        storage.questions_for_quiz(settings.quiz_id)?
    };
    let questions = match draw_questions(bank, settings.length) {
        Ok(questions) => questions,
        Err(Error::NotEnoughQuestions { available, needed }) => {
            warn!("Quiz '{slug}' has {available} questions but needs {needed}");
            let notice = embeds::error(format!(
                "`{slug}` doesn't have enough questions yet ({available} of {needed} needed). Ask a manager to top up the bank."
            ));
            let _ = dm
                .send_message(&ctx.http, CreateMessage::new().embed(notice.clone()))
                .await;
            return followup_embed(ctx, cmd, notice, true).await;
        }
        Err(e) => return Err(e),
    };

    info!("Starting quiz '{slug}' for user {user_id}");

    let minutes = handler.question_timeout.as_secs() / 60;
    let intro = embeds::titled(
        format!("Quiz: {slug}"),
        format!(
            "You'll get {} question(s) and need {} correct to pass.\n\
             Answer each one within {minutes} minute(s).",
            questions.len(),
            settings.min_correct
        ),
        embeds::COLOUR_OK,
    );
    if dm
        .send_message(&ctx.http, CreateMessage::new().embed(intro))
        .await
        .is_err()
    {
        return followup_embed(
            ctx,
            cmd,
            embeds::error("I couldn't DM you. Allow direct messages from server members and try again."),
            true,
        )
        .await;
    }

    followup_embed(ctx, cmd, embeds::normal("Check your DMs!"), true).await?;

    let total = questions.len();
    let mut correct_count = 0;
    let mut timed_out = false;

    for (index, question) in questions.iter().enumerate() {
        if timed_out {
            // Remaining questions count as incorrect once the taker walks away.
            let storage = handler.storage.lock().await;
            storage.record_question_attempt(user_id, question.id, false)?;
            continue;
        }

        let answer = ask_question(handler, ctx, dm, question, index + 1, total).await?;
        let correct = answer.unwrap_or(false);

        {
            let storage = handler.storage.lock().await;
            storage.record_question_attempt(user_id, question.id, correct)?;
        }

        let feedback = match answer {
            Some(true) => {
                correct_count += 1;
                embeds::titled("Correct!", &question.correct_answer_text, embeds::COLOUR_OK)
            }
            Some(false) => embeds::titled(
                "Incorrect.",
                &question.incorrect_answer_text,
                embeds::COLOUR_WARN,
            ),
            None => {
                timed_out = true;
                embeds::titled(
                    "Time's up.",
                    "Unanswered questions count as incorrect.",
                    embeds::COLOUR_WARN,
                )
            }
        };
        dm.send_message(&ctx.http, CreateMessage::new().embed(feedback))
            .await?;
    }

    let outcome = QuizOutcome {
        correct: correct_count,
        total,
        min_correct: settings.min_correct,
    };
    let passed = outcome.passed();

    {
        let storage = handler.storage.lock().await;
        storage.record_quiz_attempt(user_id, settings.quiz_id, passed)?;
    }

    apply_roles(ctx, guild_id, cmd.user.id, settings, passed).await;
    info!(
        "Quiz '{slug}' finished for user {user_id}: {}/{} ({})",
        outcome.correct,
        outcome.total,
        if passed { "passed" } else { "failed" }
    );

    let verdict = if passed {
        embeds::titled(
            "You passed!",
            format!(
                "{}/{} correct (needed {}).",
                outcome.correct, outcome.total, outcome.min_correct
            ),
            embeds::COLOUR_OK,
        )
    } else {
        embeds::titled(
            "Not this time.",
            format!(
                "{}/{} correct (needed {}). You can retake the quiz once a manager restores your access.",
                outcome.correct, outcome.total, outcome.min_correct
            ),
            embeds::COLOUR_WARN,
        )
    };
    dm.send_message(&ctx.http, CreateMessage::new().embed(verdict))
        .await?;

    Ok(())
}

/// Ask one question over DM.
///
/// Returns `Some(correct)` when the taker submits an answer and `None` when
/// the question times out.
async fn ask_question(
    handler: &Handler,
    ctx: &Context,
    dm: ChannelId,
    question: &Question,
    number: usize,
    total: usize,
) -> Result<Option<bool>> {
    let mut sheet = AnswerSheet::new(question);

    let mut message = dm
        .send_message(
            &ctx.http,
            CreateMessage::new()
                .embed(embeds::question_embed(question, number, total))
                .components(question_rows(question, &sheet, false)),
        )
        .await?;

    loop {
        let press = message
            .await_component_interaction(&ctx.shard)
            .timeout(handler.question_timeout)
            .await;

        let Some(press) = press else {
            message
                .edit(
                    &ctx.http,
                    EditMessage::new().components(question_rows(question, &sheet, true)),
                )
                .await?;
            return Ok(None);
        };

        if press.data.custom_id == "submit" {
            if sheet.is_empty() {
                press
                    .create_response(
                        &ctx.http,
                        CreateInteractionResponse::Message(
                            CreateInteractionResponseMessage::new()
                                .embed(embeds::error("Pick at least one answer first."))
                                .ephemeral(true),
                        ),
                    )
                    .await?;
                continue;
            }

            let correct = sheet.grade(question);
            press
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new()
                            .components(question_rows(question, &sheet, true)),
                    ),
                )
                .await?;
            return Ok(Some(correct));
        }

        if let Some(idx) = press
            .data
            .custom_id
            .strip_prefix("choice_")
            .and_then(|raw| raw.parse::<usize>().ok())
        {
            sheet.press(idx);
        }
        press
            .create_response(
                &ctx.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .components(question_rows(question, &sheet, false)),
                ),
            )
            .await?;
    }
}

/// Build the button rows for a question: one button per choice plus Submit.
fn question_rows(question: &Question, sheet: &AnswerSheet, disabled: bool) -> Vec<CreateActionRow> {
    let choices = question
        .choices
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            let style = if sheet.is_selected(idx) {
                ButtonStyle::Primary
            } else {
                ButtonStyle::Secondary
            };
            CreateButton::new(format!("choice_{idx}"))
                .label(choice_letter(idx).to_string())
                .style(style)
                .disabled(disabled)
        })
        .collect();

    let submit = CreateButton::new("submit")
        .label("Submit")
        .style(ButtonStyle::Success)
        .disabled(disabled);

    vec![
        CreateActionRow::Buttons(choices),
        CreateActionRow::Buttons(vec![submit]),
    ]
}

/// Grant and revoke roles according to the verdict. Role failures are logged
/// rather than aborting; the attempt is already recorded.
async fn apply_roles(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
    settings: &QuizSettings,
    passed: bool,
) {
    let mut grants = Vec::new();
    if passed {
        grants.push(settings.passing_role);
        if let Some(second) = settings.passing_role_two {
            grants.push(second);
        }
    } else {
        grants.push(settings.non_passing_role);
    }

    for role in grants {
        if let Err(e) = ctx
            .http
            .add_member_role(guild_id, user_id, RoleId::new(role), Some("Quiz result"))
            .await
        {
            warn!("Could not grant role {role} to {user_id}: {e}");
        }
    }

    if let Err(e) = ctx
        .http
        .remove_member_role(
            guild_id,
            user_id,
            RoleId::new(settings.required_role),
            Some("Quiz taken"),
        )
        .await
    {
        warn!(
            "Could not remove role {} from {user_id}: {e}",
            settings.required_role
        );
    }
}
