//! Slash command definitions.
//!
//! These builders describe the full command set registered against the guild
//! when an authorized user asks for a sync.

use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};

/// Option describing a quiz slug, with autocomplete backed by `quiz_types`.
fn quiz_option(description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "quiz", description)
        .required(true)
        .set_autocomplete(true)
}

fn quiz_command() -> CreateCommand {
    CreateCommand::new("quiz")
        .description("Take a quiz")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "start",
                "Start a quiz; questions arrive over DM",
            )
            .add_sub_option(quiz_option("The quiz to take")),
        )
}

fn settings_command() -> CreateCommand {
    let manager_group = CreateCommandOption::new(
        CommandOptionType::SubCommandGroup,
        "manager",
        "Manage who can administer the bot",
    )
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::SubCommand, "add", "Add a manager")
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::User, "user", "The user to add")
                    .required(true),
            ),
    )
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::SubCommand, "remove", "Remove a manager")
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::User, "user", "The user to remove")
                    .required(true),
            ),
    )
    .add_sub_option(
        CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "check",
            "Check whether a user is a manager",
        )
        .add_sub_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "The user to check")
                .required(true),
        ),
    )
    .add_sub_option(CreateCommandOption::new(
        CommandOptionType::SubCommand,
        "list",
        "List all managers",
    ));

    let quiz_group = CreateCommandOption::new(
        CommandOptionType::SubCommandGroup,
        "quiz",
        "Manage quiz types",
    )
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::SubCommand, "add", "Create a quiz type")
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "quiz", "Slug for the new quiz")
                    .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "length",
                    "Questions asked per attempt",
                )
                .required(true)
                .min_int_value(1),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "min_correct",
                    "Correct answers needed to pass",
                )
                .required(true)
                .min_int_value(1),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Role,
                    "required_role",
                    "Role a member must hold to take the quiz",
                )
                .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Role,
                    "passing_role",
                    "Role granted on passing",
                )
                .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Role,
                    "non_passing_role",
                    "Role granted on failing",
                )
                .required(true),
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::Role,
                "passing_role_two",
                "Second role granted on passing",
            )),
    )
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::SubCommand, "remove", "Delete a quiz type")
            .add_sub_option(quiz_option("The quiz to delete")),
    )
    .add_sub_option(CreateCommandOption::new(
        CommandOptionType::SubCommand,
        "list",
        "List all quiz types",
    ))
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::SubCommand, "get", "Show a quiz's settings")
            .add_sub_option(quiz_option("The quiz to inspect")),
    );

    let edit_group = CreateCommandOption::new(
        CommandOptionType::SubCommandGroup,
        "quiz-edit",
        "Change one quiz setting",
    )
    .add_sub_option(
        CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "length",
            "Change how many questions are asked",
        )
        .add_sub_option(quiz_option("The quiz to edit"))
        .add_sub_option(
            CreateCommandOption::new(CommandOptionType::Integer, "length", "New length")
                .required(true)
                .min_int_value(1),
        ),
    )
    .add_sub_option(
        CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "min-correct",
            "Change how many correct answers are needed to pass",
        )
        .add_sub_option(quiz_option("The quiz to edit"))
        .add_sub_option(
            CreateCommandOption::new(CommandOptionType::Integer, "min_correct", "New minimum")
                .required(true)
                .min_int_value(1),
        ),
    );

    CreateCommand::new("settings")
        .description("Configure the quiz bot (managers only)")
        .dm_permission(false)
        .add_option(manager_group)
        .add_option(quiz_group)
        .add_option(edit_group)
}

fn questions_command() -> CreateCommand {
    let add = CreateCommandOption::new(
        CommandOptionType::SubCommand,
        "add",
        "Add a question to a quiz's bank",
    )
    .add_sub_option(quiz_option("The quiz this question belongs to"))
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::String, "question", "The question text")
            .required(true),
    )
    .add_sub_option(
        CreateCommandOption::new(
            CommandOptionType::String,
            "correct_answers",
            "Digits of the correct answers, e.g. 13 for answers one and three",
        )
        .required(true),
    )
    .add_sub_option(
        CreateCommandOption::new(
            CommandOptionType::String,
            "correct_response",
            "Feedback shown on a correct answer",
        )
        .required(true),
    )
    .add_sub_option(
        CreateCommandOption::new(
            CommandOptionType::String,
            "incorrect_response",
            "Feedback shown on an incorrect answer",
        )
        .required(true),
    )
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::String, "answer_one", "First answer choice")
            .required(true),
    )
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::String, "answer_two", "Second answer choice")
            .required(true),
    )
    .add_sub_option(CreateCommandOption::new(
        CommandOptionType::String,
        "answer_three",
        "Third answer choice",
    ))
    .add_sub_option(CreateCommandOption::new(
        CommandOptionType::String,
        "answer_four",
        "Fourth answer choice",
    ))
    .add_sub_option(CreateCommandOption::new(
        CommandOptionType::String,
        "answer_five",
        "Fifth answer choice",
    ))
    .add_sub_option(CreateCommandOption::new(
        CommandOptionType::String,
        "image",
        "Image URL shown with the question",
    ));

    CreateCommand::new("questions")
        .description("Manage the question bank (managers only)")
        .dm_permission(false)
        .add_option(add)
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "remove", "Remove a question")
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "question_id",
                        "Id of the question to remove",
                    )
                    .required(true)
                    .min_int_value(1),
                ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "list",
                "List a quiz's questions",
            )
            .add_sub_option(quiz_option("The quiz to list")),
        )
}

fn stats_command() -> CreateCommand {
    let get_group = CreateCommandOption::new(
        CommandOptionType::SubCommandGroup,
        "get",
        "Look up attempt statistics",
    )
    .add_sub_option(
        CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "user-quiz",
            "Every recorded attempt for a user",
        )
        .add_sub_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "The user to look up")
                .required(true),
        ),
    )
    .add_sub_option(
        CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "aggregate-quiz",
            "Aggregate pass rates for a quiz",
        )
        .add_sub_option(quiz_option("The quiz to aggregate")),
    );

    CreateCommand::new("stats")
        .description("Quiz attempt statistics (managers only)")
        .dm_permission(false)
        .add_option(get_group)
}

/// The full command set registered on sync.
#[must_use]
pub fn all() -> Vec<CreateCommand> {
    vec![
        quiz_command(),
        settings_command(),
        questions_command(),
        stats_command(),
    ]
}
