//! Command line surface: argument parsing, task selection and rendering.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    error::AppResult,
    models::{NewUser, User},
    services::UserStore,
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "user-records",
    version,
    about = "List, view and create rows of the users table"
)]
pub struct Cli {
    /// Task to run: list, view or create
    #[arg(long = "task-name", visible_alias = "taskName", default_value = "none")]
    pub task_name: String,

    /// Id of the user to view (required for the view task)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub id: i64,

    /// Name of the user to create (required for the create task)
    #[arg(long)]
    pub name: Option<String>,

    /// Email of the user to create (required for the create task)
    #[arg(long)]
    pub email: Option<String>,

    /// How records are printed
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Env file to load before reading the environment; must exist if given
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Database URL, overriding DB_URL
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `id | name | email` line per record
    Text,
    /// JSON values
    Json,
}

/// Operation selected by `--task-name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    List,
    View,
    Create,
    None,
    Unknown(String),
}

impl Task {
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "list" => Task::List,
            "view" | "view-user" => Task::View,
            "create" => Task::Create,
            "" | "none" => Task::None,
            other => Task::Unknown(other.to_string()),
        }
    }
}

/// How an invocation ended, independent of logged operation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    UsageError,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::UsageError => ExitCode::from(1),
        }
    }
}

impl Cli {
    pub fn task(&self) -> Task {
        Task::parse(&self.task_name)
    }

    /// The `--id` value when it can name a row
    fn view_id(&self) -> Option<i32> {
        i32::try_from(self.id).ok().filter(|id| *id > 0)
    }

    /// The `--name`/`--email` pair as given, when neither is blank
    fn new_user(&self) -> Option<NewUser> {
        let present = |value: &Option<String>| {
            value.as_deref().filter(|s| !s.trim().is_empty()).map(str::to_string)
        };
        Some(NewUser::new(present(&self.name)?, present(&self.email)?))
    }
}

fn usage_error(cli: &Cli) -> Option<&'static str> {
    match cli.task() {
        Task::View if cli.view_id().is_none() => {
            Some("Error: the 'view' task requires a valid positive --id flag.")
        }
        Task::Create if cli.new_user().is_none() => {
            Some("Error: the 'create' task requires non-empty --name and --email flags.")
        }
        _ => None,
    }
}

/// Answers invocations that never touch the database
///
/// Covers usage errors and the none/unknown selectors. Returns `None` when the
/// task has valid arguments and needs a store.
pub fn preflight<O, E>(cli: &Cli, out: &mut O, err: &mut E) -> AppResult<Option<Outcome>>
where
    O: Write,
    E: Write,
{
    if let Some(message) = usage_error(cli) {
        writeln!(err, "{}", message)?;
        writeln!(err, "{}", Cli::command().render_help())?;
        return Ok(Some(Outcome::UsageError));
    }

    match cli.task() {
        Task::None => writeln!(out, "You need to specify a task name.")?,
        Task::Unknown(name) => writeln!(out, "Unknown task specified: {}", name)?,
        _ => return Ok(None),
    }
    writeln!(out, "{}", Cli::command().render_help())?;

    Ok(Some(Outcome::Success))
}

/// Runs the task selected on the command line against `store`
///
/// Records go to `out`; usage errors go to `err`. Failures reported by the
/// store are logged and do not change the outcome.
pub async fn dispatch<S, O, E>(store: &S, cli: &Cli, out: &mut O, err: &mut E) -> AppResult<Outcome>
where
    S: UserStore + ?Sized,
    O: Write,
    E: Write,
{
    if let Some(outcome) = preflight(cli, out, err)? {
        return Ok(outcome);
    }

    match cli.task() {
        Task::List => match store.list_users().await {
            Ok(users) => render_users(out, &users, cli.format)?,
            Err(e) => tracing::error!(error = %e, "List users failed"),
        },
        Task::View => {
            if let Some(id) = cli.view_id() {
                match store.get_user(id).await {
                    Ok(user) => render_user(out, user.as_ref(), cli.format)?,
                    Err(e) => tracing::error!(error = %e, id, "Select user failed"),
                }
            }
        }
        Task::Create => {
            if let Some(new_user) = cli.new_user() {
                match store.create_user(new_user).await {
                    Ok(user) => render_user(out, Some(&user), cli.format)?,
                    Err(e) => tracing::error!(error = %e, "Create user failed"),
                }
            }
        }
        Task::None | Task::Unknown(_) => {}
    }

    Ok(Outcome::Success)
}

fn render_users<W: Write>(out: &mut W, users: &[User], format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for user in users {
                writeln!(out, "{}", user)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, users)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn render_user<W: Write>(out: &mut W, user: Option<&User>, format: OutputFormat) -> AppResult<()> {
    match (format, user) {
        (OutputFormat::Text, Some(user)) => writeln!(out, "{}", user)?,
        (OutputFormat::Text, None) => writeln!(out, "User not found")?,
        (OutputFormat::Json, user) => {
            serde_json::to_writer(&mut *out, &user)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
