//! The `/settings` command family: managers, quiz types, and quiz edits.

use serenity::all::{CommandInteraction, Context};
use tracing::info;

use super::{
    embeds, int_option, respond_embed, role_option, split_subcommand, str_option, user_option,
    Handler,
};
use crate::error::Result;
use crate::storage::NewQuizSettings;

pub(crate) async fn handle(handler: &Handler, ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
    if !handler.authorize(ctx, cmd).await? {
        return Ok(());
    }

    let options = cmd.data.options();
    let Some((group, subs)) = split_subcommand(&options) else {
        return Ok(());
    };
    let Some((action, args)) = split_subcommand(subs) else {
        return Ok(());
    };

    match (group, action) {
        ("manager", "add") => manager_add(handler, ctx, cmd, args).await,
        ("manager", "remove") => manager_remove(handler, ctx, cmd, args).await,
        ("manager", "check") => manager_check(handler, ctx, cmd, args).await,
        ("manager", "list") => manager_list(handler, ctx, cmd).await,
        ("quiz", "add") => quiz_add(handler, ctx, cmd, args).await,
        ("quiz", "remove") => quiz_remove(handler, ctx, cmd, args).await,
        ("quiz", "list") => quiz_list(handler, ctx, cmd).await,
        ("quiz", "get") => quiz_get(handler, ctx, cmd, args).await,
        ("quiz-edit", "length") => quiz_edit_length(handler, ctx, cmd, args).await,
        ("quiz-edit", "min-correct") => quiz_edit_min_correct(handler, ctx, cmd, args).await,
        _ => Ok(()),
    }
}

async fn manager_add(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[serenity::all::ResolvedOption<'_>],
) -> Result<()> {
    let Some(user) = user_option(args, "user") else {
        return Ok(());
    };

    let storage = handler.storage.lock().await;
    if storage.is_manager(user.id.get())? {
        return respond_embed(
            ctx,
            cmd,
            embeds::error(format!("<@{}> is already a manager.", user.id)),
            true,
        )
        .await;
    }

    storage.add_manager(user.id.get(), cmd.user.id.get())?;
    drop(storage);

    info!("Manager {} added by {}", user.id, cmd.user.id);
    respond_embed(
        ctx,
        cmd,
        embeds::normal(format!("<@{}> is now a manager.", user.id)),
        true,
    )
    .await
}

async fn manager_remove(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[serenity::all::ResolvedOption<'_>],
) -> Result<()> {
    let Some(user) = user_option(args, "user") else {
        return Ok(());
    };

    let removed = {
        let storage = handler.storage.lock().await;
        storage.remove_manager(user.id.get())?
    };

    if removed {
        info!("Manager {} removed by {}", user.id, cmd.user.id);
        respond_embed(
            ctx,
            cmd,
            embeds::normal(format!("<@{}> is no longer a manager.", user.id)),
            true,
        )
        .await
    } else {
        respond_embed(
            ctx,
            cmd,
            embeds::error(format!("<@{}> was not a manager.", user.id)),
            true,
        )
        .await
    }
}

async fn manager_check(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[serenity::all::ResolvedOption<'_>],
) -> Result<()> {
    let Some(user) = user_option(args, "user") else {
        return Ok(());
    };

    let is_manager = {
        let storage = handler.storage.lock().await;
        storage.is_manager(user.id.get())?
    };

    let description = if is_manager {
        format!("<@{}> is a manager.", user.id)
    } else {
        format!("<@{}> is not a manager.", user.id)
    };
    respond_embed(ctx, cmd, embeds::normal(description), true).await
}

async fn manager_list(handler: &Handler, ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
    let managers = {
        let storage = handler.storage.lock().await;
        storage.list_managers()?
    };

    if managers.is_empty() {
        return respond_embed(ctx, cmd, embeds::normal("No managers registered."), true).await;
    }

    let mut description = String::new();
    for manager in &managers {
        description.push_str(&format!(
            "**{}.** <@{}> since {}, added by <@{}>\n",
            manager.id,
            manager.discord_id,
            manager.added_at.format("%Y-%m-%d"),
            manager.added_by
        ));
    }

    respond_embed(
        ctx,
        cmd,
        embeds::titled("Managers", description, embeds::COLOUR_OK),
        true,
    )
    .await
}

async fn quiz_add(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[serenity::all::ResolvedOption<'_>],
) -> Result<()> {
    let (Some(slug), Some(length), Some(min_correct)) = (
        str_option(args, "quiz"),
        int_option(args, "length"),
        int_option(args, "min_correct"),
    ) else {
        return Ok(());
    };
    let (Some(required_role), Some(passing_role), Some(non_passing_role)) = (
        role_option(args, "required_role"),
        role_option(args, "passing_role"),
        role_option(args, "non_passing_role"),
    ) else {
        return Ok(());
    };
    let passing_role_two = role_option(args, "passing_role_two");

    let (Ok(length), Ok(min_correct)) = (usize::try_from(length), usize::try_from(min_correct))
    else {
        return respond_embed(
            ctx,
            cmd,
            embeds::error("Length and minimum correct must be positive."),
            true,
        )
        .await;
    };
    if min_correct > length {
        return respond_embed(
            ctx,
            cmd,
            embeds::error("Minimum correct cannot exceed the quiz length."),
            true,
        )
        .await;
    }

    let mut storage = handler.storage.lock().await;
    if storage.quiz_exists(slug)? {
        return respond_embed(
            ctx,
            cmd,
            embeds::error(format!("A quiz named `{slug}` already exists.")),
            true,
        )
        .await;
    }

    let settings = NewQuizSettings {
        length,
        min_correct,
        required_role: required_role.id.get(),
        passing_role: passing_role.id.get(),
        passing_role_two: passing_role_two.map(|role| role.id.get()),
        non_passing_role: non_passing_role.id.get(),
    };
    storage.add_quiz(slug, &settings)?;
    drop(storage);

    info!("Quiz '{slug}' created by {}", cmd.user.id);
    respond_embed(
        ctx,
        cmd,
        embeds::normal(format!("Quiz `{slug}` created.")),
        true,
    )
    .await
}

async fn quiz_remove(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[serenity::all::ResolvedOption<'_>],
) -> Result<()> {
    let Some(slug) = str_option(args, "quiz") else {
        return Ok(());
    };

    let removed = {
        let mut storage = handler.storage.lock().await;
        storage.remove_quiz(slug)?
    };

    if removed {
        info!("Quiz '{slug}' removed by {}", cmd.user.id);
        respond_embed(
            ctx,
            cmd,
            embeds::normal(format!("Quiz `{slug}` removed.")),
            true,
        )
        .await
    } else {
        respond_embed(
            ctx,
            cmd,
            embeds::error(format!("No quiz named `{slug}` exists.")),
            true,
        )
        .await
    }
}

async fn quiz_list(handler: &Handler, ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
    let quizzes = {
        let storage = handler.storage.lock().await;
        storage.list_quizzes()?
    };

    if quizzes.is_empty() {
        return respond_embed(ctx, cmd, embeds::normal("No quizzes configured."), true).await;
    }

    let mut description = String::new();
    for quiz in &quizzes {
        description.push_str(&format!("**{}.** `{}`\n", quiz.id, quiz.slug));
    }
    respond_embed(
        ctx,
        cmd,
        embeds::titled("Quizzes", description, embeds::COLOUR_OK),
        true,
    )
    .await
}

async fn quiz_get(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[serenity::all::ResolvedOption<'_>],
) -> Result<()> {
    let Some(slug) = str_option(args, "quiz") else {
        return Ok(());
    };

    let settings = {
        let storage = handler.storage.lock().await;
        storage.quiz_settings(slug)?
    };
    let Some(settings) = settings else {
        return respond_embed(
            ctx,
            cmd,
            embeds::error(format!("No quiz named `{slug}` exists.")),
            true,
        )
        .await;
    };

    let mut description = format!(
        "Length: {}\nMinimum correct: {} ({:.0}% to pass)\nRequired role: <@&{}>\nPassing role: <@&{}>\n",
        settings.length,
        settings.min_correct,
        settings.passing_grade() * 100.0,
        settings.required_role,
        settings.passing_role,
    );
    if let Some(second) = settings.passing_role_two {
        description.push_str(&format!("Second passing role: <@&{second}>\n"));
    }
    description.push_str(&format!("Non-passing role: <@&{}>", settings.non_passing_role));

    respond_embed(
        ctx,
        cmd,
        embeds::titled(format!("Quiz: {slug}"), description, embeds::COLOUR_OK),
        true,
    )
    .await
}

async fn quiz_edit_length(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[serenity::all::ResolvedOption<'_>],
) -> Result<()> {
    let (Some(slug), Some(length)) = (str_option(args, "quiz"), int_option(args, "length")) else {
        return Ok(());
    };
    let Ok(length) = usize::try_from(length) else {
        return respond_embed(ctx, cmd, embeds::error("Length must be positive."), true).await;
    };

    let updated = {
        let storage = handler.storage.lock().await;
        storage.set_quiz_length(slug, length)?
    };

    if updated {
        respond_embed(
            ctx,
            cmd,
            embeds::normal(format!("`{slug}` now asks {length} question(s).")),
            true,
        )
        .await
    } else {
        respond_embed(
            ctx,
            cmd,
            embeds::error(format!("No quiz named `{slug}` exists.")),
            true,
        )
        .await
    }
}

async fn quiz_edit_min_correct(
    handler: &Handler,
    ctx: &Context,
    cmd: &CommandInteraction,
    args: &[serenity::all::ResolvedOption<'_>],
) -> Result<()> {
    let (Some(slug), Some(min_correct)) =
        (str_option(args, "quiz"), int_option(args, "min_correct"))
    else {
        return Ok(());
    };
    let Ok(min_correct) = usize::try_from(min_correct) else {
        return respond_embed(
            ctx,
            cmd,
            embeds::error("Minimum correct must be positive."),
            true,
        )
        .await;
    };

    let updated = {
        let storage = handler.storage.lock().await;
        storage.set_quiz_min_correct(slug, min_correct)?
    };

    if updated {
        respond_embed(
            ctx,
            cmd,
            embeds::normal(format!("`{slug}` now requires {min_correct} correct answer(s).")),
            true,
        )
        .await
    } else {
        respond_embed(
            ctx,
            cmd,
            embeds::error(format!("No quiz named `{slug}` exists.")),
            true,
        )
        .await
    }
}
