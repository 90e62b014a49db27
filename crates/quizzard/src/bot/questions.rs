//! The `/questions` command family: bank maintenance and the paginated
//! listing.

use serenity::all::{
    ButtonStyle, CommandInteraction, Context, CreateActionRow, CreateButton,
    CreateInteractionResponse, CreateInteractionResponseMessage, EditMessage, ResolvedOption,
};
use tracing::info;

use super::{embeds, int_option, respond_embed, split_subcommand, str_option, Handler};
use crate::error::{Error, Result};
use crate::quiz::{parse_correct_answers, NewQuestion, MAX_CHOICES};

pub(crate) async fn handle(handler: &Handler, ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
    if !handler.authorize(ctx, cmd).await? {
        return Ok(());
    }

    let options = cmd.data.options();
    let Some((action, args)) = split_subcommand(&options) else {
        return Ok(());
    };

    match action {
        "add" => add(handler, ctx, cmd, args).await,
        "remove" => remove(handler, ctx, cmd, args).await,
        "list" => list(handler, ctx, cmd, args).await,
        _ => Ok(()),
    }
}

async fn add(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[ResolvedOption<'_>],
) -> Result<()> {
    let (Some(slug), Some(text), Some(correct_answers)) = (
        str_option(args, "quiz"),
        str_option(args, "question"),
        str_option(args, "correct_answers"),
    ) else {
        return Ok(());
    };
    let (Some(correct_response), Some(incorrect_response)) = (
        str_option(args, "correct_response"),
        str_option(args, "incorrect_response"),
    ) else {
        return Ok(());
    };

    let answers: [Option<&str>; MAX_CHOICES] = [
        str_option(args, "answer_one"),
        str_option(args, "answer_two"),
        str_option(args, "answer_three"),
        str_option(args, "answer_four"),
        str_option(args, "answer_five"),
    ];
    let image = str_option(args, "image").map(str::to_string);

    let question = match NewQuestion::from_parts(
        text,
        correct_response,
        incorrect_response,
        image,
        &answers,
        &parse_correct_answers(correct_answers),
    ) {
        Ok(question) => question,
        Err(Error::InvalidQuestion { message }) => {
            return respond_embed(ctx, cmd, embeds::error(message), true).await;
        }
        Err(e) => return Err(e),
    };

    let mut storage = handler.storage.lock().await;
    let Some(quiz_id) = storage.quiz_id(slug)? else {
        return respond_embed(
            ctx,
            cmd,
            embeds::error(format!("No quiz named `{slug}` exists.")),
            true,
        )
        .await;
    };

    let question_id = storage.add_question(quiz_id, cmd.user.id.get(), &question)?;
    drop(storage);

    info!("Question {question_id} added to '{slug}' by {}", cmd.user.id);
    respond_embed(
        ctx,
        cmd,
        embeds::normal(format!("Question **#{question_id}** added to `{slug}`.")),
        true,
    )
    .await
}

async fn remove(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[ResolvedOption<'_>],
) -> Result<()> {
    let Some(question_id) = int_option(args, "question_id") else {
        return Ok(());
    };

    let removed = {
        let mut storage = handler.storage.lock().await;
        storage.remove_question(question_id)?
    };

    if removed {
        info!("Question {question_id} removed by {}", cmd.user.id);
        respond_embed(
            ctx,
            cmd,
            embeds::normal(format!("Question **#{question_id}** removed.")),
            true,
        )
        .await
    } else {
        respond_embed(
            ctx,
            cmd,
            embeds::error(format!("No question with id {question_id} exists.")),
            true,
        )
        .await
    }
}

async fn list(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[ResolvedOption<'_>],
) -> Result<()> {
    let Some(slug) = str_option(args, "quiz") else {
        return Ok(());
    };

    let questions = {
        let storage = handler.storage.lock().await;
        let Some(quiz_id) = storage.quiz_id(slug)? else {
            drop(storage);
            return respond_embed(
                ctx,
                cmd,
                embeds::error(format!("No quiz named `{slug}` exists.")),
                true,
            )
            .await;
        };
        storage.questions_for_quiz(quiz_id)?
    };

    if questions.is_empty() {
        return respond_embed(
            ctx,
            cmd,
            embeds::normal(format!("`{slug}` has no questions yet.")),
            true,
        )
        .await;
    }

    let pages = embeds::paginate_questions(&questions, handler.questions_per_page);
    let title = format!("Questions: {slug}");

    if pages.len() == 1 {
        return respond_embed(
            ctx,
            cmd,
            embeds::titled(title, &pages[0], embeds::COLOUR_OK),
            true,
        )
        .await;
    }

    // Multi-page listing with Previous/Next buttons.
    let mut page = 0;
    cmd.create_response(
        &ctx.http,
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .ephemeral(true)
                .embed(page_embed(&title, &pages, page))
                .components(pager_rows(page, pages.len(), false)),
        ),
    )
    .await?;
    let mut message = cmd.get_response(&ctx.http).await?;

    loop {
        let press = message
            .await_component_interaction(&ctx.shard)
            .timeout(handler.question_timeout)
            .await;

        let Some(press) = press else {
            message
                .edit(
                    &ctx.http,
                    EditMessage::new().components(pager_rows(page, pages.len(), true)),
                )
                .await?;
            return Ok(());
        };

        match press.data.custom_id.as_str() {
            "previous" => page = page.saturating_sub(1),
            "next" => page = (page + 1).min(pages.len() - 1),
            _ => {}
        }

        press
            .create_response(
                &ctx.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(page_embed(&title, &pages, page))
                        .components(pager_rows(page, pages.len(), false)),
                ),
            )
            .await?;
    }
}

fn page_embed(title: &str, pages: &[String], page: usize) -> serenity::all::CreateEmbed {
    embeds::titled(
        format!("{title} ({}/{})", page + 1, pages.len()),
        &pages[page],
        embeds::COLOUR_OK,
    )
}

fn pager_rows(page: usize, total: usize, disabled: bool) -> Vec<CreateActionRow> {
    let previous = CreateButton::new("previous")
        .label("Previous")
        .style(ButtonStyle::Secondary)
        .disabled(disabled || page == 0);
    let next = CreateButton::new("next")
        .label("Next")
        .style(ButtonStyle::Secondary)
        .disabled(disabled || page + 1 == total);

    vec![CreateActionRow::Buttons(vec![previous, next])]
}
