use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::catalog::{DEFAULT_API_BASE, Platform, SortBy};
use crate::fetch::{DEFAULT_PROXY_PREFIX, FetchSettings};
use crate::view::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Human,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "f2p-cli",
    version,
    about = "Browse the FreeToGame catalog with local favorites"
)]
pub struct Cli {
    #[arg(long, global = true, value_enum, default_value_t = OutputFormatArg::Human)]
    pub format: OutputFormatArg,
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub json: bool,
    /// SQLite file holding favorites (default: ~/.f2p-cli/f2p.db)
    #[arg(long, global = true, env = "F2P_DB_PATH")]
    pub db_path: Option<PathBuf>,
    #[command(flatten)]
    pub network: NetworkArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct NetworkArgs {
    #[arg(long, global = true, env = "F2P_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
    /// Prefix the percent-encoded target url is appended to on fallback
    #[arg(long, global = true, env = "F2P_PROXY_PREFIX", default_value = DEFAULT_PROXY_PREFIX)]
    pub proxy_prefix: String,
    /// Never retry through the proxy
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub no_proxy: bool,
    /// Treat the host as offline; no request is attempted
    #[arg(long, global = true, env = "F2P_OFFLINE", action = ArgAction::SetTrue)]
    pub offline: bool,
    #[arg(long, global = true, env = "F2P_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

impl NetworkArgs {
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            proxy_prefix: self.proxy_prefix.clone(),
            proxy_fallback: !self.no_proxy,
            offline: self.offline,
            timeout: self.timeout_secs.map(Duration::from_secs),
            ..FetchSettings::default()
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List games, optionally narrowed by platform and one category tag
    Games(GamesArgs),
    /// List games matching up to 6 tags at once
    Filter(FilterArgs),
    /// Show details for one game
    Game(GameArgs),
    /// Print the known tag names
    Tags,
    Favorites(FavoritesCommand),
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Case-insensitive title filter applied locally
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, default_value_t = false)]
    pub favorites_only: bool,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

#[derive(Debug, Args)]
pub struct GamesArgs {
    #[arg(long, value_enum, default_value_t = Platform::All)]
    pub platform: Platform,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_enum, default_value_t = SortBy::Relevance)]
    pub sort_by: SortBy,
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Comma-separated tag names
    #[arg(long)]
    pub tags: String,
    #[arg(long, value_enum, default_value_t = Platform::All)]
    pub platform: Platform,
    #[arg(long, value_enum, default_value_t = SortBy::Relevance)]
    pub sort_by: SortBy,
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Args)]
pub struct GameArgs {
    pub id: u64,
}

#[derive(Debug, Args)]
pub struct FavoriteIdArgs {
    pub id: u64,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesSubcommands {
    List,
    Add(FavoriteIdArgs),
    Remove(FavoriteIdArgs),
    Toggle(FavoriteIdArgs),
}

#[derive(Debug, Args)]
pub struct FavoritesCommand {
    #[command(subcommand)]
    pub action: FavoritesSubcommands,
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    pub fn resolved_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            match self.format {
                OutputFormatArg::Human => OutputFormat::Human,
                OutputFormatArg::Json => OutputFormat::Json,
            }
        }
    }
}
