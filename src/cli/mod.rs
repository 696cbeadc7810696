//! Command-line entry point.
//!
//! Parses arguments, builds the shared [`Context`] and dispatches each
//! subcommand to the stores in [`crate::core`].

pub mod articles;
pub mod browser;
pub mod chat;
pub mod site;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::Url;
use tracing::warn;

use crate::api::{ApiClient, AuthProvider};
use crate::cli::articles::ArticleCommands;
use crate::cli::browser::BrowserRedirector;
use crate::core::auth::{AuthSession, RestoreOutcome};
use crate::core::config::{Config, ConfigKey};
use crate::core::keyring::KeyringStore;
use crate::core::locale::{Locale, LocaleStore};
use crate::core::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::core::theme::ThemePreference;

const VERSION: &str = match option_env!("VERGEN_GIT_DESCRIBE") {
    Some(describe) => describe,
    None => env!("CARGO_PKG_VERSION"),
};

#[derive(Parser)]
#[command(name = "fisherman")]
#[command(version = VERSION)]
#[command(about = "Terminal client for the AI Fisherman site")]
#[command(
    long_about = "Fisherman talks to the AI Fisherman backend: browse and manage articles, \
search the knowledge base, chat with the site assistant and look through courses and \
open source projects.\n\n\
Environment Variables:\n\
  FISHERMAN_API_BASE  Backend base URL (defaults to http://localhost:8000/api)\n\
  FISHERMAN_LOG       Log filter directive, e.g. 'fisherman=debug'"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL for this invocation
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Append diagnostic logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in through GitHub or Google
    Login {
        /// Identity provider
        #[arg(default_value = "github")]
        provider: AuthProvider,
        /// Install a local admin session without contacting the backend
        #[arg(long)]
        mock: bool,
    },
    /// Finish a sign-in using the address the browser was sent back to
    Callback {
        /// Full redirect address, including the token and user parameters
        url: String,
    },
    /// Forget the saved session
    Logout,
    /// Show who is signed in, re-validating the saved token
    Whoami,
    /// Browse and manage articles
    Articles {
        #[command(subcommand)]
        command: ArticleCommands,
    },
    /// Search the knowledge base
    Search {
        /// Search text
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
        /// Maximum number of results
        #[arg(long, default_value_t = crate::api::client::DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
    /// Chat with the site assistant (default)
    Chat {
        /// Stream replies as they are generated
        #[arg(long)]
        stream: bool,
    },
    /// Ask the assistant a single question
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
        /// Stream the reply as it is generated
        #[arg(long)]
        stream: bool,
    },
    /// List courses, or show one in detail
    Courses {
        /// Course ID
        id: Option<String>,
    },
    /// List open source projects
    Projects {
        /// Only the featured projects
        #[arg(long)]
        featured: bool,
    },
    /// Show or change the colour theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },
    /// Show or change the interface language
    Locale {
        #[command(subcommand)]
        command: Option<LocaleCommands>,
    },
    /// Resolve a site path the way the web app would
    Route {
        /// Path such as /articles/rag-implementation
        path: String,
    },
    /// Index administration (admin only)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum ThemeCommands {
    /// Cycle light, dark, system
    Toggle,
    /// Pick a theme
    Set { theme: ThemePreference },
    /// Print the current theme
    Show,
}

#[derive(Subcommand)]
pub enum LocaleCommands {
    /// Pick a language (en, zh)
    Set { locale: Locale },
    /// Print the current language
    Show,
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Search index statistics
    Stats,
    /// Rebuild the search index
    Reindex {
        /// Directory of markdown sources on the backend host
        #[arg(long)]
        directory: Option<String>,
        /// Base URL used for links in indexed documents
        #[arg(long, default_value = "/articles")]
        base_url: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print all configuration values
    Show,
    /// Set a configuration value
    Set { key: ConfigKey, value: String },
    /// Unset a configuration value
    Unset { key: ConfigKey },
}

/// Everything a command needs: configuration, the backend client and
/// persisted state.
pub struct Context {
    pub config: Config,
    pub client: ApiClient,
    pub store: Arc<dyn KeyValueStore>,
}

impl Context {
    pub fn new(config: Config, api_base_override: Option<&str>) -> Self {
        let api_base = api_base_override
            .map(str::to_string)
            .unwrap_or_else(|| config.api_base());
        let client = ApiClient::new(&api_base);
        let store = open_store(&config);
        Self {
            config,
            client,
            store,
        }
    }

    pub fn locale(&self) -> LocaleStore {
        LocaleStore::load(Arc::clone(&self.store))
    }

    /// Restore the saved session, re-validating it against the backend.
    pub async fn session(&self) -> Result<AuthSession, Box<dyn Error>> {
        let mut session = AuthSession::new(Arc::clone(&self.store));
        let report = session.init(&self.client, None).await?;
        if report.restore == RestoreOutcome::Rejected {
            eprintln!("⚠️  Saved session is no longer valid; signed out");
        }
        Ok(session)
    }
}

fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    match config.storage_path() {
        Some(path) if config.use_keyring() => Arc::new(KeyringStore::new(FileStore::new(path))),
        Some(path) => Arc::new(FileStore::new(path)),
        None => {
            warn!("No data directory available; state will not be saved");
            Arc::new(MemoryStore::new())
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    crate::logging::init(args.verbose, args.log_file.as_deref())?;

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };
    let ctx = Context::new(config, args.api_base.as_deref());

    let result = run(&ctx, args.command.unwrap_or(Commands::Chat { stream: false })).await;
    if let Err(err) = result {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(ctx: &Context, command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Login { provider, mock } => {
            let mut session = AuthSession::new(Arc::clone(&ctx.store));
            if mock {
                session.mock_login(provider)?;
                println!("✅ Signed in as the local test admin");
            } else {
                session.login(&ctx.client, provider, &BrowserRedirector);
                println!("After signing in, run: fisherman callback '<address from your browser>'");
            }
            Ok(())
        }
        Commands::Callback { url } => {
            let address = Url::parse(&url).map_err(|err| format!("invalid address '{url}': {err}"))?;
            let mut session = AuthSession::new(Arc::clone(&ctx.store));
            match session.handle_oauth_callback(&address)? {
                Some(cleaned) => {
                    let locale = ctx.locale();
                    if let Some(user) = session.user() {
                        println!("✅ {}: {} <{}>", locale.t("auth.loginSuccess"), user.name, user.email);
                    }
                    println!("Continue at: {cleaned}");
                    Ok(())
                }
                None => Err("No usable token and user parameters in that address".into()),
            }
        }
        Commands::Logout => {
            let mut session = AuthSession::new(Arc::clone(&ctx.store));
            session.logout()?;
            println!("✅ {}", ctx.locale().t("auth.logoutSuccess"));
            Ok(())
        }
        Commands::Whoami => {
            let session = ctx.session().await?;
            match session.user() {
                Some(user) => {
                    println!("{} <{}>", user.name, user.email);
                    println!("  provider: {}", user.provider);
                    println!("  role: {}", if user.is_admin() { "admin" } else { "user" });
                }
                None => println!("{}", ctx.locale().t("auth.loginRequired")),
            }
            Ok(())
        }
        Commands::Articles { command } => articles::run(ctx, command).await,
        Commands::Search { query, limit } => site::search(ctx, &query.join(" "), limit).await,
        Commands::Chat { stream } => chat::repl(ctx, stream).await,
        Commands::Ask { question, stream } => chat::ask(ctx, &question.join(" "), stream).await,
        Commands::Courses { id } => site::courses(ctx, id.as_deref()),
        Commands::Projects { featured } => site::projects(ctx, featured),
        Commands::Theme { command } => site::theme(ctx, command.unwrap_or(ThemeCommands::Show)),
        Commands::Locale { command } => site::locale(ctx, command.unwrap_or(LocaleCommands::Show)),
        Commands::Route { path } => site::route(ctx, &path).await,
        Commands::Admin { command } => site::admin(ctx, command).await,
        Commands::Config { command } => configure(ctx, command.unwrap_or(ConfigCommands::Show)),
    }
}

fn configure(ctx: &Context, command: ConfigCommands) -> Result<(), Box<dyn Error>> {
    let mut config = ctx.config.clone();
    match command {
        ConfigCommands::Show => {
            config.print_all();
            return Ok(());
        }
        ConfigCommands::Set { key, value } => {
            config.set_value(key, &value)?;
            println!("✅ Set {key} to: {}", value.trim());
        }
        ConfigCommands::Unset { key } => {
            config.unset_value(key);
            println!("✅ Unset {key}");
        }
    }
    config.save()?;
    Ok(())
}
