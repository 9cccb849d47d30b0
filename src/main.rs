//! veriscan - product verification CLI
//!
//! Checks product authenticity, compares prices and pulls product details
//! from photos, with scan history synced to your account.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use veriscan::analysis::{ImageSet, ScanIntent, SortMode};
use veriscan::baas::{BaasClient, BaasStore, ProfileUpdate};
use veriscan::commands::{account, HistoryCommand, HistoryQuery, ScanCommand, ScanRequest};
use veriscan::config::{Config, OutputFormat};
use veriscan::preferences::Preferences;
use veriscan::theme::ThemeMode;

#[derive(Parser)]
#[command(
    name = "veriscan",
    version,
    about = "Verify products, compare prices and read product details from photos",
    long_about = "Submits product photos to an analysis backend and keeps your scan history in your account."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the local preferences file
    #[arg(long, global = true, env = "VERISCAN_PREFS")]
    prefs: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Analysis backend URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "VERISCAN_PROXY")]
    proxy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze product photos
    #[command(alias = "s")]
    Scan {
        /// Front photo of the product
        front: Option<PathBuf>,

        /// Back photo of the product
        #[arg(short, long)]
        back: Option<PathBuf>,

        /// What to do with the photos: verify, price, details
        #[arg(short, long)]
        intent: Option<ScanIntent>,

        /// Price ordering: price_asc, price_desc, rating
        #[arg(long)]
        sort: Option<SortMode>,

        /// Don't save this scan to history
        #[arg(long)]
        no_save: bool,
    },

    /// List past scans
    #[command(alias = "h")]
    History {
        /// Only show scans with this intent
        #[arg(short, long)]
        intent: Option<ScanIntent>,

        /// Match product name or brand
        #[arg(short, long)]
        search: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Show the full result of one scan
        #[arg(long, value_name = "SCAN_ID")]
        show: Option<String>,
    },

    /// Sign in to your account
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "VERISCAN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "VERISCAN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Change your password
    Password {
        /// New password
        #[arg(short, long, env = "VERISCAN_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },

    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Show or edit account settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Show or change the color theme
    Theme {
        /// light, dark or system
        mode: Option<ThemeMode>,

        /// Resolve `system` as dark
        #[arg(long)]
        system_dark: bool,
    },

    /// Contact support
    Support {
        subject: String,
        message: String,
    },

    /// Export all your account data as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete your account data and sign out
    DeleteAccount {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        avatar_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    /// Set one or more KEY=VALUE pairs (theme, default_scan_intent, language, notifications_enabled)
    Set {
        #[arg(required = true, value_parser = parse_key_value)]
        pairs: Vec<(String, String)>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("Expected KEY=VALUE, got: {}", s))
}

fn store(config: &Config, prefs: &Preferences) -> Result<BaasClient> {
    Ok(BaasClient::new(config)?.with_session(prefs.session.as_ref()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    let prefs_path = cli
        .prefs
        .or_else(Preferences::default_path)
        .context("No config directory found; pass --prefs")?;
    let mut prefs = Preferences::load(&prefs_path)?;
    let format = config.format;

    let output = match cli.command {
        Commands::Scan { front, back, intent, sort, no_save } => {
            let request = ScanRequest {
                images: ImageSet::new(front, back),
                intent: intent.unwrap_or(config.default_intent),
                sort: sort.unwrap_or(config.sort),
                save: !no_save,
            };
            ScanCommand::new(config, prefs.session.clone()).execute(&request).await?
        }

        Commands::History { intent, search, page, show } => {
            let session = prefs.require_session()?.clone();
            let query = HistoryQuery { intent, search, page: page.saturating_sub(1), show };
            HistoryCommand::new(config, session).execute(&query).await?
        }

        Commands::Login { email, password } => {
            let client = store(&config, &prefs)?;
            account::login(&client, &mut prefs, &email, &password).await?
        }

        Commands::Register { email, password } => {
            let client = store(&config, &prefs)?;
            account::register(&client, &mut prefs, &email, &password).await?
        }

        Commands::Logout => {
            let client = store(&config, &prefs)?;
            account::logout(&client, &mut prefs).await?
        }

        Commands::Password { new } => {
            let client = store(&config, &prefs)?;
            account::change_password(&client, &prefs, &new).await?
        }

        Commands::Profile { action } => {
            let client = store(&config, &prefs)?;
            match action {
                ProfileAction::Show => account::show_profile(&client, &prefs, format).await?,
                ProfileAction::Set { name, avatar_url } => {
                    let update = ProfileUpdate { full_name: name, avatar_url };
                    account::update_profile(&client, &prefs, &update).await?
                }
            }
        }

        Commands::Settings { action } => {
            let client = store(&config, &prefs)?;
            match action {
                SettingsAction::Show => account::show_settings(&client, &mut prefs, format).await?,
                SettingsAction::Set { pairs } => {
                    account::update_settings(&client, &mut prefs, &pairs).await?
                }
            }
        }

        Commands::Theme { mode, system_dark } => {
            let client = match config.baas_credentials() {
                Some(_) => Some(store(&config, &prefs)?),
                None => None,
            };
            let client = client.as_ref().map(|c| c as &dyn BaasStore);
            account::theme(client, &mut prefs, mode, system_dark, format).await?
        }

        Commands::Support { subject, message } => {
            let client = store(&config, &prefs)?;
            account::support(&client, &prefs, &subject, &message).await?
        }

        Commands::Export { output } => {
            let client = store(&config, &prefs)?;
            account::export(&client, &prefs, output.as_deref()).await?
        }

        Commands::DeleteAccount { yes } => {
            let client = store(&config, &prefs)?;
            account::delete_account(&client, &mut prefs, yes).await?
        }
    };

    prefs.save(&prefs_path)?;
    println!("{}", output);

    Ok(())
}
