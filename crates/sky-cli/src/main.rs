//! Skylark CLI
//!
//! Single binary for all Skylark operations:
//! - Account (login, logout, SSH keys, billing)
//! - App management (create, scale, configs, domains, releases)
//! - Remote observer session (SSH tunnel + local routing)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skylark::commands;
use sky_api::ApiClient;
use sky_core::credentials;

#[derive(Parser)]
#[command(name = "skylark")]
#[command(author, version, about = "Skylark platform-as-a-service client")]
#[command(propagate_version = true)]
struct Cli {
    /// Control-plane host
    #[arg(long, global = true, env = "SKYLARK_HOST", default_value = sky_api::DEFAULT_HOST)]
    host: String,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store an API key
    Login,

    /// Remove stored credentials
    Logout,

    /// List your apps
    Apps,

    /// Create a new app
    Create {
        /// App name (assigned by the platform if omitted)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Destroy an app and everything in it
    Destroy {
        /// App to destroy
        app: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change an app's replica count or size
    Scale {
        /// App to scale
        app: String,
        /// Number of replicas
        #[arg(short, long)]
        replicas: Option<u32>,
        /// Replica size in memory units
        #[arg(short, long)]
        size: Option<f64>,
    },

    /// Manage an app's configuration variables
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage an app's custom domains
    Domains {
        #[command(subcommand)]
        action: DomainAction,
    },

    /// List an app's releases
    Releases {
        /// App to inspect
        app: String,
    },

    /// Roll an app back to a previous release
    Rollback {
        /// App to roll back
        app: String,
        /// Release version (latest rollbackable if omitted)
        version: Option<String>,
    },

    /// Manage account SSH keys
    Keys {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Manage billing
    Billing {
        #[command(subcommand)]
        action: BillingAction,
    },

    /// Launch a remote observer to inspect a production node
    Observer {
        /// App (registered node name) to observe
        app_name: String,
        /// Public IP of the node's SSH endpoint
        ssh_ip: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show config variables
    List { app: String },
    /// Set a config variable (restarts the app)
    Set {
        app: String,
        key: String,
        value: String,
    },
    /// Remove a config variable
    Unset { app: String, key: String },
}

#[derive(Subcommand)]
enum DomainAction {
    /// List domains
    List { app: String },
    /// Attach a fully-qualified domain
    Add { app: String, fqdn: String },
    /// Detach a domain
    Remove { app: String, fqdn: String },
}

#[derive(Subcommand)]
enum KeyAction {
    /// List SSH keys
    List,
    /// Add a public key (key material or path to a .pub file)
    Add { key: String },
    /// Remove a key by id
    Remove { id: u64 },
}

#[derive(Subcommand)]
enum BillingAction {
    /// Show the payment method on file
    Show,
    /// Replace the payment method with a new card token
    Set { token: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Login => commands::login_command(&cli.host).await?,
        Commands::Logout => commands::logout_command()?,

        Commands::Apps => commands::apps_command(&client(&cli.host)?).await?,
        Commands::Create { name } => {
            commands::create_command(&client(&cli.host)?, name.as_deref()).await?;
        }
        Commands::Destroy { app, force } => {
            commands::destroy_command(&client(&cli.host)?, &app, force).await?;
        }
        Commands::Scale {
            app,
            replicas,
            size,
        } => {
            commands::scale_command(&client(&cli.host)?, &app, replicas, size).await?;
        }

        Commands::Config { action } => {
            let client = client(&cli.host)?;
            match action {
                ConfigAction::List { app } => commands::config_list_command(&client, &app).await?,
                ConfigAction::Set { app, key, value } => {
                    commands::config_set_command(&client, &app, &key, &value).await?;
                }
                ConfigAction::Unset { app, key } => {
                    commands::config_unset_command(&client, &app, &key).await?;
                }
            }
        }

        Commands::Domains { action } => {
            let client = client(&cli.host)?;
            match action {
                DomainAction::List { app } => {
                    commands::domains_list_command(&client, &app).await?;
                }
                DomainAction::Add { app, fqdn } => {
                    commands::domains_add_command(&client, &app, &fqdn).await?;
                }
                DomainAction::Remove { app, fqdn } => {
                    commands::domains_remove_command(&client, &app, &fqdn).await?;
                }
            }
        }

        Commands::Releases { app } => {
            commands::releases_command(&client(&cli.host)?, &app).await?;
        }
        Commands::Rollback { app, version } => {
            commands::rollback_command(&client(&cli.host)?, &app, version.as_deref()).await?;
        }

        Commands::Keys { action } => {
            let client = client(&cli.host)?;
            match action {
                KeyAction::List => commands::keys_list_command(&client).await?,
                KeyAction::Add { key } => commands::keys_add_command(&client, &key).await?,
                KeyAction::Remove { id } => commands::keys_remove_command(&client, id).await?,
            }
        }

        Commands::Billing { action } => {
            let client = client(&cli.host)?;
            match action {
                BillingAction::Show => commands::billing_show_command(&client).await?,
                BillingAction::Set { token } => {
                    commands::billing_set_command(&client, &token).await?;
                }
            }
        }

        Commands::Observer { app_name, ssh_ip } => {
            // Blocking on purpose: the session shells out to ssh/erl and the
            // observer GUI holds the foreground until the user exits.
            commands::observer_command(&app_name, &ssh_ip)?;
        }
    }

    Ok(())
}

/// Build an authenticated API client from stored credentials
fn client(host: &str) -> Result<ApiClient> {
    let credentials = credentials::load().context("Cannot call the API")?;
    Ok(ApiClient::new(host, &credentials))
}
