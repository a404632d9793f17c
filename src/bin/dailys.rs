use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use daily_todos::clock::{Clock, SystemClock};
use daily_todos::config::Config;
use daily_todos::{Client, SessionStore, TaskId, TaskList, TaskUpdate, TodoError, TodoResult};

/// Manage your daily to-do list
#[derive(Parser)]
#[command(name = "dailys", version)]
struct Cli {
    /// Root URL of the server (overrides DAILY_TODOS_API_URL)
    #[arg(long)]
    api_url: Option<String>,
    /// Where the session is stored (overrides DAILY_TODOS_SESSION_FILE)
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session
    Login { email: String, password: String },
    /// Create an account
    Register { name: String, email: String, password: String },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Show the tasks of a day (today by default)
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Create a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// HH:MM
        #[arg(long)]
        due: Option<String>,
    },
    /// Change some fields of a task
    Edit(EditArgs),
    /// Mark a task as done, or as not done
    Toggle {
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a task
    Delete {
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Args)]
struct EditArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Remove the description
    #[arg(long, conflicts_with = "description")]
    clear_description: bool,
    /// Move the task to another day
    #[arg(long)]
    to: Option<NaiveDate>,
    /// HH:MM
    #[arg(long)]
    due: Option<String>,
    /// Remove the due time
    #[arg(long, conflicts_with = "due")]
    clear_due: bool,
    /// Day the task currently belongs to (today by default)
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl EditArgs {
    fn fields(&self) -> TodoResult<TaskUpdate> {
        let mut fields = TaskUpdate::new();
        if let Some(title) = &self.title {
            fields = fields.with_title(title);
        }
        if let Some(description) = &self.description {
            fields = fields.with_description(description);
        }
        if self.clear_description {
            fields = fields.clear_description();
        }
        if let Some(to) = self.to {
            fields = fields.with_date(to);
        }
        if let Some(due) = &self.due {
            fields = fields.with_due_time(daily_todos::parse_due_time(due)?);
        }
        if self.clear_due {
            fields = fields.clear_due_time();
        }
        Ok(fields)
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        log::debug!("{:?}", err);
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> TodoResult<()> {
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.parse()?;
    }
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }

    let client = Client::from_url(config.api_url.clone())?;
    let store = SessionStore::new(&config.session_file);

    match cli.command {
        Command::Login{ email, password } => {
            let session = client.login(&email, &password).await?;
            store.save(&session)?;
            println!("Logged in as {} <{}>", session.user().name, session.user().email);
        },
        Command::Register{ name, email, password } => {
            let user = client.register(&name, &email, &password).await?;
            println!("Account created for {} <{}>. You can now log in.", user.name, user.email);
        },
        Command::Logout => {
            store.clear()?;
            println!("Logged out");
        },
        Command::Whoami => {
            match store.load()? {
                None => println!("Not logged in"),
                Some(session) => println!("{} <{}>", session.user().name, session.user().email),
            }
        },
        other => {
            let session = store.load()?
                .ok_or_else(|| TodoError::Authentication("not logged in, please run `dailys login` first".to_string()))?;
            let mut list = TaskList::new(client.with_session(session), SystemClock);
            run_task_command(&mut list, other).await?;

            daily_todos::utils::print_week_strip(list.clock().today(), list.selected_date());
            daily_todos::utils::print_task_list(list.selected_date(), list.tasks(), list.summary());
        },
    }
    Ok(())
}

async fn run_task_command<A, C>(list: &mut TaskList<A, C>, command: Command) -> TodoResult<()>
where
    A: daily_todos::traits::TaskApi,
    C: Clock,
{
    let today = list.clock().today();
    match command {
        Command::List{ date } => {
            list.load_tasks_for_date(date.unwrap_or(today)).await?;
        },
        Command::Add{ title, description, date, due } => {
            let date = date.unwrap_or(today);
            let due_time = due.as_deref().map(daily_todos::parse_due_time).transpose()?;
            list.load_tasks_for_date(date).await?;
            let task = list.create_task(&title, description.as_deref(), date, due_time).await?;
            println!("Created {}", task.id());
        },
        Command::Edit(edit) => {
            let fields = edit.fields()?;
            list.load_tasks_for_date(edit.date.unwrap_or(today)).await?;
            list.update_task(&edit.id.parse::<TaskId>()?, &fields).await?;
        },
        Command::Toggle{ id, date } => {
            list.load_tasks_for_date(date.unwrap_or(today)).await?;
            list.toggle_task(&id.parse::<TaskId>()?).await?;
        },
        Command::Delete{ id, date } => {
            list.load_tasks_for_date(date.unwrap_or(today)).await?;
            list.delete_task(&id.parse::<TaskId>()?).await?;
        },
        Command::Login{ .. } | Command::Register{ .. } | Command::Logout | Command::Whoami => {},
    }
    Ok(())
}
