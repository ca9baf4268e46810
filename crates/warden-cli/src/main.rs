//! Warden command-line entry point.
//!
//! Each invocation connects to SurrealDB, applies pending migrations,
//! runs one command and prints its result as JSON on stdout.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use surrealdb::engine::remote::ws::Client;
use tracing_subscriber::EnvFilter;
use warden_auth::{
    AuthService, LoginInput, RegisterInput, TodoService, UpdateProfileInput, ValidatedClaims,
};
use warden_core::models::todo::{CreateTodo, UpdateTodo};
use warden_core::repository::Pagination;
use warden_db::DbManager;
use warden_db::repository::{SurrealPrincipalRepository, SurrealTodoRepository};

use crate::config::Settings;

#[derive(Debug, Parser)]
#[command(name = "warden", version, about = "Accounts, tokens and owner-guarded todos")]
struct Cli {
    /// Access token, bare or as `Bearer <token>`.
    #[arg(long, env = "WARDEN_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "WARDEN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Exchange email and password for an access token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "WARDEN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the account behind the current token.
    Whoami,
    /// Change the display name and/or password of the current account.
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    #[command(subcommand)]
    Todo(TodoCommand),
}

#[derive(Debug, Subcommand)]
enum TodoCommand {
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List {
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 50)]
        limit: u64,
    },
    Get {
        id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: i64,
    },
}

type Auth = AuthService<SurrealPrincipalRepository<Client>>;
type Todos = TodoService<SurrealTodoRepository<Client>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warden=info".parse()?))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env().context("failed to load WARDEN_* settings")?;
    let auth_config = settings.auth_config();
    auth_config.validate()?;

    let db = DbManager::connect(&settings.db_config())
        .await
        .context("failed to connect to SurrealDB")?;
    warden_db::run_migrations(db.client()).await?;

    let auth = AuthService::new(SurrealPrincipalRepository::new(db.client().clone()), auth_config);
    let todos = TodoService::new(SurrealTodoRepository::new(db.client().clone()));

    let output = run(cli, &auth, &todos).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(cli: Cli, auth: &Auth, todos: &Todos) -> anyhow::Result<Value> {
    let token = cli.token.as_deref();

    let output = match cli.command {
        Command::Register {
            email,
            password,
            name,
        } => serde_json::to_value(
            auth.register(RegisterInput {
                email,
                password,
                display_name: name,
            })
            .await?,
        )?,
        Command::Login { email, password } => {
            serde_json::to_value(auth.login(LoginInput { email, password }).await?)?
        }
        Command::Whoami => {
            let identity = auth.authenticate_header(token)?;
            serde_json::to_value(auth.profile(&identity).await?)?
        }
        Command::UpdateProfile { name, password } => {
            let identity = auth.authenticate_header(token)?;
            let input = UpdateProfileInput {
                display_name: name,
                password,
            };
            serde_json::to_value(auth.update_profile(&identity, input).await?)?
        }
        Command::Todo(command) => {
            let identity = auth.authenticate_header(token)?;
            run_todo(command, &identity, todos).await?
        }
    };

    Ok(output)
}

async fn run_todo(
    command: TodoCommand,
    identity: &ValidatedClaims,
    todos: &Todos,
) -> anyhow::Result<Value> {
    let output = match command {
        TodoCommand::Create { title, description } => serde_json::to_value(
            todos
                .create(identity, CreateTodo { title, description })
                .await?,
        )?,
        TodoCommand::List { offset, limit } => serde_json::to_value(
            todos
                .list(identity, Pagination { offset, limit })
                .await?,
        )?,
        TodoCommand::Get { id } => serde_json::to_value(todos.get(identity, id).await?)?,
        TodoCommand::Update {
            id,
            title,
            description,
        } => serde_json::to_value(
            todos
                .update(identity, id, UpdateTodo { title, description })
                .await?,
        )?,
        TodoCommand::Delete { id } => serde_json::to_value(todos.delete(identity, id).await?)?,
    };

    Ok(output)
}
