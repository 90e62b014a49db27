//! The `/stats get` command family.

use serenity::all::{CommandInteraction, Context, ResolvedOption};

use super::{embeds, respond_embed, split_subcommand, str_option, user_option, Handler};
use crate::error::Result;

pub(crate) async fn handle(handler: &Handler, ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
    if !handler.authorize(ctx, cmd).await? {
        return Ok(());
    }

    let options = cmd.data.options();
    let Some(("get", subs)) = split_subcommand(&options) else {
        return Ok(());
    };
    let Some((action, args)) = split_subcommand(subs) else {
        return Ok(());
    };

    match action {
        "user-quiz" => user_quiz(handler, ctx, cmd, args).await,
        "aggregate-quiz" => aggregate_quiz(handler, ctx, cmd, args).await,
        _ => Ok(()),
    }
}

async fn user_quiz(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[ResolvedOption<'_>],
) -> Result<()> {
    let Some(user) = user_option(args, "user") else {
        return Ok(());
    };

    let attempts = {
        let storage = handler.storage.lock().await;
        storage.attempts_for_user(user.id.get())?
    };

    if attempts.is_empty() {
        return respond_embed(
            ctx,
            cmd,
            embeds::normal(format!("<@{}> has no recorded attempts.", user.id)),
            true,
        )
        .await;
    }

    let mut description = String::new();
    for attempt in &attempts {
        let verdict = if attempt.passed { "passed" } else { "failed" };
        description.push_str(&format!(
            "`{}` {verdict} on {}\n",
            attempt.quiz_slug,
            attempt.timestamp.format("%Y-%m-%d %H:%M UTC")
        ));
    }

    respond_embed(
        ctx,
        cmd,
        embeds::titled(
            format!("Attempts by {}", user.name),
            description,
            embeds::COLOUR_OK,
        ),
        true,
    )
    .await
}

async fn aggregate_quiz(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[ResolvedOption<'_>],
) -> Result<()> {
    let Some(slug) = str_option(args, "quiz") else {
        return Ok(());
    };

    let aggregate = {
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
        storage.quiz_aggregate(quiz_id)?
    };

    let Some(aggregate) = aggregate else {
        return respond_embed(
            ctx,
            cmd,
            embeds::normal(format!("`{slug}` has no recorded attempts.")),
            true,
        )
        .await;
    };

    let description = format!(
        "All quizzes: {} attempt(s), {:.1}% passed\n\
         `{slug}`: {} attempt(s), {:.1}% passed\n\
         Oldest attempt: {}\nNewest attempt: {}",
        aggregate.total_attempts,
        aggregate.total_pass_ratio * 100.0,
        aggregate.attempts,
        aggregate.pass_ratio * 100.0,
        aggregate.oldest_attempt.format("%Y-%m-%d %H:%M UTC"),
        aggregate.newest_attempt.format("%Y-%m-%d %H:%M UTC"),
    );

    respond_embed(
        ctx,
        cmd,
        embeds::titled(format!("Stats: {slug}"), description, embeds::COLOUR_OK),
        true,
    )
    .await
}
