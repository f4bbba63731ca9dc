use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use feedback_core::identity::StaticDirectory;
use feedback_core::service::DEFAULT_APP_URL;
use feedback_core::Database;

/// Demo cast used when no identity seed is given.
const BUNDLED_USERS: &str = include_str!("../config/users.json");

#[derive(Debug, Parser)]
#[command(name = "fbt")]
#[command(about = "Performance-review feedback tracker")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The requested command, `serve` with its defaults when none was given.
    pub fn command(self) -> Commands {
        self.command
            .unwrap_or_else(|| Commands::Serve(ServeArgs::parse_from(["fbt"])))
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Check whether a server is running
    Status(AddrArgs),
    /// Print the identity directory
    Users(UsersArgs),
}

#[derive(Debug, Clone, Args)]
pub struct AddrArgs {
    /// Interface to bind or check
    #[arg(long, env = "FBT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the HTTP API
    #[arg(short, long, env = "FBT_PORT", default_value_t = 5000)]
    pub port: u16,
}

impl AddrArgs {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Args)]
pub struct UsersArgs {
    /// JSON file with the identity directory (defaults to the bundled demo users)
    #[arg(long, env = "FBT_USERS")]
    pub users: Option<PathBuf>,
}

impl UsersArgs {
    pub fn load_directory(&self) -> anyhow::Result<StaticDirectory> {
        load_directory(self.users.as_deref())
    }
}

#[derive(Debug, Clone, Parser)]
pub struct ServeArgs {
    #[command(flatten)]
    pub addr: AddrArgs,

    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "FBT_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(flatten)]
    pub users: UsersArgs,

    /// Base URL of the web application, used for links in notifications
    #[arg(long, env = "FBT_APP_URL", default_value = DEFAULT_APP_URL)]
    pub app_url: String,
}

impl ServeArgs {
    /// Open and migrate the configured database.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = match &self.database {
            Some(path) => Database::open(path)
                .with_context(|| format!("failed to open database {}", path.display()))?,
            None => Database::open_default().context("failed to open default database")?,
        };
        db.migrate().context("failed to migrate database")?;
        Ok(db)
    }
}

/// Load the identity seed from `path`, or the bundled demo cast.
pub fn load_directory(path: Option<&Path>) -> anyhow::Result<StaticDirectory> {
    match path {
        Some(path) => StaticDirectory::from_path(path)
            .with_context(|| format!("failed to load users from {}", path.display())),
        None => StaticDirectory::from_json(BUNDLED_USERS).context("bundled users are invalid"),
    }
}
