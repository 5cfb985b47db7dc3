mod backend;
mod components;
mod error;
#[cfg(test)]
mod fake;
mod flow;
mod http;
mod login;
mod pools;
mod reset;
mod session;
mod store;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use records::{SortDirection, SortField, messages};
use serde_json::{Value, json};

use crate::components::ComponentListManager;
use crate::error::CliError;
use crate::flow::FlowError;
use crate::http::HttpBackend;
use crate::login::LoginFlow;
use crate::pools::{DetailStatus, PoolDetailManager, PoolListManager};
use crate::reset::ResetFlow;
use crate::session::{GateDecision, Session, resolve_gate};
use crate::store::{KEY_SESSION_TOKEN, LocalStore, state_dir};

#[derive(Parser, Debug)]
#[command(name = "pool", about = "Workshop Pool command-line client")]
struct Cli {
    #[arg(long, env = "POOL_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Directory holding the local session file.
    #[arg(long, env = "POOL_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Register {
        email: String,
        #[arg(long, env = "POOL_PASSWORD")]
        password: String,
    },
    Login(LoginArgs),
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: String,
        #[arg(long, env = "POOL_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    Pools(PoolsCommand),
    Pool(PoolCommand),
    Components(ComponentsCommand),
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(required_unless_present = "github_token")]
    email: Option<String>,

    #[arg(long, env = "POOL_PASSWORD", required_unless_present = "github_token")]
    password: Option<String>,

    /// Sign in with a GitHub access token instead of a password.
    #[arg(long, conflicts_with_all = ["email", "password"])]
    github_token: Option<String>,
}

#[derive(Args, Debug)]
struct PoolsCommand {
    #[command(subcommand)]
    command: PoolsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PoolsSubcommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "pool")]
        sort: SortField,
        #[arg(long, default_value_t = false)]
        desc: bool,
    },
    Add {
        name: String,
    },
    Delete {
        pool_id: String,
    },
}

#[derive(Args, Debug)]
struct PoolCommand {
    #[command(subcommand)]
    command: PoolSubcommand,
}

#[derive(Subcommand, Debug)]
enum PoolSubcommand {
    Show { pool_id: String },
    AddMember { pool_id: String, email: String },
    RemoveMember { pool_id: String, email: String },
}

#[derive(Args, Debug)]
struct ComponentsCommand {
    #[command(subcommand)]
    command: ComponentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ComponentsSubcommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        component_id: String,
    },
}

struct CliContext {
    backend: HttpBackend,
    local: LocalStore,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let local = LocalStore::open(&state_dir(cli.state_dir.as_deref())?)?;
    let token = local.get(KEY_SESSION_TOKEN).map(str::to_owned);
    let backend = HttpBackend::new(&cli.base_url, token)?;
    let mut ctx = CliContext { backend, local };

    match cli.command {
        Command::Ping => {
            ctx.backend.ping().await?;
            println!("ok");
            Ok(())
        }
        Command::Register { email, password } => {
            let session = LoginFlow::new()
                .register(&ctx.backend, &ctx.backend, &mut ctx.local, &email, &password)
                .await?;
            print_session(&session)
        }
        Command::Login(args) => run_login(&mut ctx, args).await,
        Command::ForgotPassword { email } => {
            let message = ResetFlow::new().request_reset(&ctx.backend, &email).await?;
            println!("{message}");
            Ok(())
        }
        Command::ResetPassword { token, password } => {
            let message = ResetFlow::new().confirm_reset(&ctx.backend, &token, &password).await?;
            println!("{message}");
            Ok(())
        }
        Command::Logout => {
            session::logout(&ctx.backend, &mut ctx.local).await?;
            println!("signed out");
            Ok(())
        }
        Command::Whoami => {
            let session = require_session(&ctx).await?;
            print_session(&session)
        }
        Command::Pools(pools) => run_pools(&ctx, pools).await,
        Command::Pool(pool) => run_pool(&ctx, pool).await,
        Command::Components(components) => run_components(&ctx, components).await,
    }
}

async fn run_login(ctx: &mut CliContext, args: LoginArgs) -> Result<(), CliError> {
    let flow = LoginFlow::new();
    let session = match (args.github_token, args.email, args.password) {
        (Some(token), _, _) => {
            flow.login_with_github(&ctx.backend, &ctx.backend, &mut ctx.local, &token)
                .await?
        }
        (None, Some(email), Some(password)) => {
            flow.login(&ctx.backend, &ctx.backend, &mut ctx.local, &email, &password)
                .await?
        }
        _ => return Err(FlowError::invalid("email and password are required").into()),
    };
    print_session(&session)
}

/// Run the session gate; protected commands proceed only when it authorizes.
async fn require_session(ctx: &CliContext) -> Result<Session, CliError> {
    let state = resolve_gate(&ctx.backend, &ctx.local).await?;
    match state.decide() {
        GateDecision::Authorized(session) => Ok(session),
        GateDecision::Pending | GateDecision::RedirectToLogin => Err(CliError::NotSignedIn),
    }
}

async fn run_pools(ctx: &CliContext, pools: PoolsCommand) -> Result<(), CliError> {
    let session = require_session(ctx).await?;
    let list = PoolListManager::new(&session.email);
    match pools.command {
        PoolsSubcommand::List { search, sort, desc } => {
            list.load(&ctx.backend).await?;
            list.set_search(search);
            list.set_sort(sort, if desc { SortDirection::Desc } else { SortDirection::Asc });
            let rows = list
                .visible()
                .into_iter()
                .map(|item| {
                    let can_delete = list.can_delete(&item);
                    json!({ "id": item.id, "pool": item.pool, "owner": item.owner, "canDelete": can_delete })
                })
                .collect::<Vec<_>>();
            print_json(&Value::Array(rows))
        }
        PoolsSubcommand::Add { name } => {
            let item = list.add_pool(&ctx.backend, &name).await?;
            print_json(&serde_json::to_value(item)?)
        }
        PoolsSubcommand::Delete { pool_id } => {
            list.load(&ctx.backend).await?;
            list.delete_pool(&ctx.backend, &pool_id).await?;
            println!("deleted {pool_id}");
            Ok(())
        }
    }
}

async fn run_pool(ctx: &CliContext, pool: PoolCommand) -> Result<(), CliError> {
    let session = require_session(ctx).await?;
    let detail = PoolDetailManager::new(&session.email);
    let pool_id = match &pool.command {
        PoolSubcommand::Show { pool_id }
        | PoolSubcommand::AddMember { pool_id, .. }
        | PoolSubcommand::RemoveMember { pool_id, .. } => pool_id.clone(),
    };

    match detail.load(&ctx.backend, &pool_id).await {
        DetailStatus::Loaded(_) => {}
        DetailStatus::NotFound => return Err(FlowError::failed(messages::POOL_NOT_FOUND).into()),
        DetailStatus::Failed(message) => return Err(FlowError::failed(message).into()),
        DetailStatus::Loading => return Err(FlowError::failed(messages::POOL_LOAD_FAILED).into()),
    }

    match pool.command {
        PoolSubcommand::Show { .. } => {}
        PoolSubcommand::AddMember { email, .. } => detail.add_member(&ctx.backend, &email).await?,
        PoolSubcommand::RemoveMember { email, .. } => detail.remove_member(&ctx.backend, &email).await?,
    }

    let Some(current) = detail.pool() else {
        return Err(FlowError::failed(messages::POOL_MISSING).into());
    };
    print_json(&json!({
        "id": current.id,
        "name": current.name,
        "owner": current.owner,
        "members": current.members,
        "canManage": detail.can_manage(),
    }))
}

async fn run_components(ctx: &CliContext, components: ComponentsCommand) -> Result<(), CliError> {
    require_session(ctx).await?;
    let list = ComponentListManager::new();
    match components.command {
        ComponentsSubcommand::List { search } => {
            list.load(&ctx.backend).await?;
            print_json(&serde_json::to_value(list.visible(&search))?)
        }
        ComponentsSubcommand::Add { name, description } => {
            let created = list.add(&ctx.backend, &name, description.as_deref()).await?;
            print_json(&serde_json::to_value(created)?)
        }
        ComponentsSubcommand::Delete { component_id } => {
            list.delete(&ctx.backend, &component_id).await?;
            println!("deleted {component_id}");
            Ok(())
        }
    }
}

fn print_session(session: &Session) -> Result<(), CliError> {
    print_json(&json!({
        "email": session.email,
        "username": session.username,
        "profile": session.profile,
    }))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
