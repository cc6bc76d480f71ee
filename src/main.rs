mod api;
mod config;
mod database;
mod error;
mod pagination;
mod posts;
mod repo;
mod schema;
mod seed;
mod server;
mod users;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{debug, error};

use crate::api::routes::state::AppState;
use crate::config::Config;
use crate::database::Database;
use crate::error::PostlineError;
use crate::pagination::PageUrlConfig;
use crate::server::WebServer;

#[derive(Parser)]
#[command(
    name = "postline",
    version,
    about = "Social posting backend with cursor-paginated feeds"
)]
struct Args {
    /// Path to a configuration file (default: ./postline.toml)
    #[arg(long = "config", short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<PostlineCommand>,
}

#[derive(Subcommand)]
enum PostlineCommand {
    /// Start the HTTP server (default command)
    Serve {
        /// Bind host (overrides configuration)
        #[arg(long = "host")]
        host: Option<String>,

        /// Bind port (overrides configuration)
        #[arg(long = "port")]
        port: Option<u16>,

        /// Database file path (overrides configuration)
        #[arg(long = "dbpath", short = 'd')]
        dbpath: Option<PathBuf>,
    },

    /// Insert demo users and posts for local development
    Seed {
        /// Number of demo users to create
        #[arg(long = "users", default_value_t = 3)]
        users: i64,

        /// Number of demo posts to create
        #[arg(long = "posts", default_value_t = 25)]
        posts: i64,

        /// Database file path (overrides configuration)
        #[arg(long = "dbpath", short = 'd')]
        dbpath: Option<PathBuf>,
    },
}

fn main() {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref());

    // The logger handle must stay alive for the duration of the process.
    let _logger = flexi_logger::Logger::try_with_str(&config.logging.level)
        .and_then(|logger| logger.start())
        .map_err(|err| eprintln!("Failed to initialize logging: {err}"))
        .ok();

    debug!(
        "Command-line args: {:?}",
        std::env::args_os().collect::<Vec<_>>()
    );

    if let Err(err) = run(args, config) {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(args: Args, config: Config) -> Result<(), PostlineError> {
    let command = args.command.unwrap_or(PostlineCommand::Serve {
        host: None,
        port: None,
        dbpath: None,
    });

    match command {
        PostlineCommand::Serve { host, port, dbpath } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let db = connect(&config, dbpath.as_deref())?;

            // The next-URL host is whatever clients can actually reach, which
            // is the configured bind address unless overridden.
            let page_url = PageUrlConfig {
                protocol: config.server.protocol.clone(),
                host: format!("{host}:{port}"),
            };
            let state = AppState::new(db, page_url, config.pagination.default_take);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(WebServer::new(host, port).start(state))
        }
        PostlineCommand::Seed {
            users,
            posts,
            dbpath,
        } => {
            let db = connect(&config, dbpath.as_deref())?;
            seed::run(&db, users, posts)
        }
    }
}

fn connect(config: &Config, dbpath: Option<&Path>) -> Result<Database, PostlineError> {
    let path = match dbpath {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(&config.database.path),
    };
    Database::connect(&path)
}
