//! OAuth2 Client Store CLI Tool
//!
//! Operator interface for the client table used by the authorization server.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Create the client table if it does not exist
//! oauth2-client-store --database-url sqlite:clients.db?mode=rwc provision
//!
//! # Register a confidential client owned by user 42
//! oauth2-client-store create \
//!   --client-id abc \
//!   --secret s3cr3t \
//!   --domain https://example.com \
//!   --user-id 42
//!
//! # Look a client up by client id
//! oauth2-client-store get --client-id abc
//! ```
//!
//! ## Environment Variables
//!
//! - `STORAGE_BACKEND`: `sqlite` or `postgres` (alternative to --backend)
//! - `DATABASE_URL`: connection string (alternative to --database-url)
//! - `CLIENT_STORE_TABLE_NAME`: client table (alternative to --table-name)
//! - `CLIENT_STORE_MAX_OPEN_CONNECTIONS`, `CLIENT_STORE_MAX_IDLE_CONNECTIONS`,
//!   `CLIENT_STORE_CONN_MAX_LIFETIME`: pool sizing
//! - `CLIENT_STORE_USER_ID_POLICY`: `zero` or `reject`
//!
//! Exit codes:
//! - 0: Success
//! - 1: Configuration or storage error
//! - 2: Client not found

use clap::{Args, Parser, Subcommand};
use oauth2_client_store::{
    config::Config,
    errors::StorageError,
    oauth::Client,
    storage::{RequestContext, TableName, create_client_store, parse_storage_backend},
};
use std::process;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;

/// Main CLI application structure
#[derive(Parser)]
#[command(
    name = "oauth2-client-store",
    about = "OAuth2 client table management",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Storage backend, overrides STORAGE_BACKEND
    #[arg(long)]
    backend: Option<String>,

    /// Connection string, overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    /// Client table, overrides CLIENT_STORE_TABLE_NAME
    #[arg(long)]
    table_name: Option<String>,

    /// Per-operation timeout such as "5s"
    #[arg(long, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Create the client table if it does not exist
    Provision,
    /// Register a new client
    Create(CreateArgs),
    /// Print a client as JSON
    Get(GetArgs),
}

/// Arguments for client creation
#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    client_id: String,

    #[arg(long, default_value = "")]
    secret: String,

    /// Allowed redirect domain
    #[arg(long, default_value = "")]
    domain: String,

    /// Register a public (non-confidential) client
    #[arg(long)]
    public: bool,

    /// Owning user id
    #[arg(long, default_value = "")]
    user_id: String,
}

/// Arguments for client retrieval
#[derive(Args)]
struct GetArgs {
    #[arg(long)]
    client_id: String,
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    duration_str::parse(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "oauth2_client_store=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => process::exit(0),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let not_found = err
                .downcast_ref::<StorageError>()
                .is_some_and(StorageError::is_not_found);
            process::exit(if not_found { 2 } else { 1 });
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::new()?;
    if let Some(backend) = cli.backend {
        config.storage_backend = backend;
    }
    if let Some(database_url) = cli.database_url {
        config.database_url = Some(database_url);
    }
    if let Some(table_name) = cli.table_name {
        config.table_name = TableName::try_from(table_name)?;
    }

    tracing::info!(version = %config.version, backend = %config.storage_backend, table = %config.table_name, "Starting client store");

    let backend =
        parse_storage_backend(&config.storage_backend, config.database_url.as_deref())?;
    let store = create_client_store(backend, config.client_store_options()).await?;

    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, canceling");
                token.cancel();
            }
        });
    }

    let mut ctx = RequestContext::with_cancellation(token);
    if let Some(timeout) = cli.timeout {
        ctx = ctx.with_timeout(timeout);
    }

    match cli.command {
        Commands::Provision => {
            tracing::info!(table = %config.table_name, "Client table ready");
        }
        Commands::Create(args) => {
            let client = Client::new(args.client_id, args.secret, args.domain)
                .with_public(args.public)
                .with_user_id(args.user_id);
            store.create(&ctx, &client).await?;
            println!("{}", serde_json::to_string_pretty(&client)?);
        }
        Commands::Get(args) => match store.get_by_id(&ctx, &args.client_id).await? {
            Some(client) => println!("{}", serde_json::to_string_pretty(&client)?),
            None => return Err(StorageError::NotFound(args.client_id).into()),
        },
    }

    Ok(())
}
