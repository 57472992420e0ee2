mod catalog;
mod cli;
mod error;
mod fetch;
mod models;
mod normalize;
mod output;
mod store;
mod view;

use std::collections::BTreeSet;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::catalog::{CatalogQuery, Endpoints, FilterQuery, TAGS, validate_tag};
use crate::cli::{
    Cli, Commands, FavoritesSubcommands, FilterArgs, GameArgs, GamesArgs, NetworkArgs,
    OutputFormat, ViewArgs,
};
use crate::error::AppError;
use crate::fetch::Fetcher;
use crate::models::{DataSource, FavoriteChange, GameListItem, Pagination};
use crate::normalize::{GameRecord, NormalizedOutcome, extract_message, normalize};
use crate::output::{build_pagination, clamp_page_size, print_error, print_success};
use crate::store::LocalStore;
use crate::view::{ViewState, platform_label, validate_search};

const NO_RESULT_FALLBACK: &str = "No results / incompatible tag combination. Try fewer tags.";
const DETAILS_UNAVAILABLE: &str = "Details not available for this game right now.";

#[derive(Debug, Serialize)]
struct GameListData {
    items: Vec<GameListItem>,
    notice: Option<String>,
    suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GameData {
    game: GameRecord,
    favorite: bool,
}

#[derive(Debug, Serialize)]
struct TagsData {
    items: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct FavoritesData {
    items: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.resolved_format();

    let result = run(cli, format).await;
    if let Err(err) = result {
        print_error(format, err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, format: OutputFormat) -> Result<(), AppError> {
    let db_path = match cli.db_path {
        Some(path) => path,
        None => LocalStore::default_path()?,
    };
    let store = LocalStore::open(&db_path)?;
    debug!(path = %db_path.display(), "store opened");

    match cli.command {
        Commands::Games(args) => handle_games(format, &cli.network, &store, args).await,
        Commands::Filter(args) => handle_filter(format, &cli.network, &store, args).await,
        Commands::Game(args) => handle_game(format, &cli.network, &store, args).await,
        Commands::Tags => {
            handle_tags(format);
            Ok(())
        }
        Commands::Favorites(cmd) => handle_favorites(format, &store, cmd.action),
    }
}

fn build_fetcher(network: &NetworkArgs) -> Result<(Fetcher, Endpoints), AppError> {
    let fetcher = Fetcher::from_settings(network.fetch_settings())
        .map_err(|e| AppError::Internal(format!("http client: {e}")))?;
    Ok((fetcher, Endpoints::new(&network.api_base)))
}

async fn handle_games(
    format: OutputFormat,
    network: &NetworkArgs,
    store: &LocalStore,
    args: GamesArgs,
) -> Result<(), AppError> {
    let category = args.category.as_deref().map(validate_tag).transpose()?;
    let query = CatalogQuery {
        platform: args.platform,
        category,
        sort_by: args.sort_by,
    };

    let (fetcher, endpoints) = build_fetcher(network)?;
    let url = endpoints.games(&query)?;
    let payload = fetcher.fetch(&url).await?;

    render_listing(format, store, args.view, payload)
}

async fn handle_filter(
    format: OutputFormat,
    network: &NetworkArgs,
    store: &LocalStore,
    args: FilterArgs,
) -> Result<(), AppError> {
    let tags = parse_tags_csv(&args.tags);
    let query = FilterQuery::new(&tags, args.platform, args.sort_by)?;

    let (fetcher, endpoints) = build_fetcher(network)?;
    let url = endpoints.filter(&query)?;
    let payload = fetcher.fetch(&url).await?;

    render_listing(format, store, args.view, payload)
}

fn render_listing(
    format: OutputFormat,
    store: &LocalStore,
    args: ViewArgs,
    payload: serde_json::Value,
) -> Result<(), AppError> {
    let (data, pagination) = build_listing(args, store.load_favorites()?, payload)?;

    let (shown, total) = (pagination.returned, pagination.total);
    print_success(
        format,
        data,
        Some(pagination),
        DataSource::FreeToGame,
        |d| print_listing_human(d, shown, total),
    );
    Ok(())
}

fn build_listing(
    args: ViewArgs,
    favorites: BTreeSet<String>,
    payload: serde_json::Value,
) -> Result<(GameListData, Pagination), AppError> {
    let search = validate_search(args.search.as_deref().unwrap_or_default())?;
    let mut view = ViewState::new(
        search,
        args.favorites_only,
        favorites,
        clamp_page_size(args.page_size),
    );

    let notice = match normalize(payload) {
        NormalizedOutcome::GameList(games) => {
            info!(count = games.len(), "catalog loaded");
            view.set_games(games);
            None
        }
        NormalizedOutcome::NoResult(message) => {
            info!(%message, "catalog returned no list");
            view.clear_games();
            Some(if message.is_empty() {
                NO_RESULT_FALLBACK.to_string()
            } else {
                message
            })
        }
    };

    view.set_page(args.page);

    let pagination = build_pagination(&view);
    let data = GameListData {
        items: view
            .visible()
            .iter()
            .map(|game| GameListItem {
                favorite: game.id().is_some_and(|id| view.favorites.contains(&id)),
                game: game.clone(),
            })
            .collect(),
        notice,
        suggestions: view
            .suggestions()
            .into_iter()
            .filter_map(|g| g.title().map(|t| t.to_string()))
            .collect(),
    };
    Ok((data, pagination))
}

/// Details must be an object carrying an `id`; anything else is reported
/// with the best message available.
fn game_from_payload(payload: serde_json::Value) -> Result<GameRecord, AppError> {
    if !payload.is_object() {
        return Err(AppError::UpstreamSchema(DETAILS_UNAVAILABLE.to_string()));
    }
    if payload.get("id").is_none() {
        let message = extract_message(&payload);
        return Err(if message.is_empty() {
            AppError::UpstreamSchema(DETAILS_UNAVAILABLE.to_string())
        } else {
            AppError::NotFound(message)
        });
    }
    Ok(GameRecord::new(payload))
}

async fn handle_game(
    format: OutputFormat,
    network: &NetworkArgs,
    store: &LocalStore,
    args: GameArgs,
) -> Result<(), AppError> {
    let (fetcher, endpoints) = build_fetcher(network)?;
    let url = endpoints.game(args.id)?;
    let payload = fetcher.fetch(&url).await?;

    let game = game_from_payload(payload)?;
    let favorite = store.load_favorites()?.contains(&args.id.to_string());
    let data = GameData { game, favorite };

    print_success(format, data, None, DataSource::FreeToGame, |d| {
        print_game_human(&d.game, d.favorite)
    });
    Ok(())
}

fn handle_tags(format: OutputFormat) {
    let data = TagsData {
        items: TAGS.to_vec(),
    };
    print_success(format, data, None, DataSource::Internal, |d| {
        println!("tags ({})", d.items.len());
        for tag in &d.items {
            println!("{tag}");
        }
    });
}

fn handle_favorites(
    format: OutputFormat,
    store: &LocalStore,
    action: FavoritesSubcommands,
) -> Result<(), AppError> {
    let change = match action {
        FavoritesSubcommands::List => {
            let data = FavoritesData {
                items: store.load_favorites()?.into_iter().collect(),
            };
            print_success(format, data, None, DataSource::LocalDb, |d| {
                println!("favorites ({})", d.items.len());
                for id in &d.items {
                    println!("{id}");
                }
            });
            return Ok(());
        }
        FavoritesSubcommands::Add(args) => {
            let id = args.id.to_string();
            let changed = store.add_favorite(&id)?;
            FavoriteChange {
                id,
                favorite: true,
                changed,
            }
        }
        FavoritesSubcommands::Remove(args) => {
            let id = args.id.to_string();
            let changed = store.remove_favorite(&id)?;
            FavoriteChange {
                id,
                favorite: false,
                changed,
            }
        }
        FavoritesSubcommands::Toggle(args) => {
            let id = args.id.to_string();
            let favorite = store.toggle_favorite(&id)?;
            FavoriteChange {
                id,
                favorite,
                changed: true,
            }
        }
    };

    print_success(format, change, None, DataSource::LocalDb, |c| {
        let state = if c.favorite { "favorited" } else { "not favorited" };
        let suffix = if c.changed { "" } else { " (unchanged)" };
        println!("{}: {}{}", c.id, state, suffix);
    });
    Ok(())
}

fn parse_tags_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

fn print_listing_human(data: &GameListData, shown: usize, total: usize) {
    if let Some(notice) = &data.notice {
        println!("{notice}");
        return;
    }
    if data.items.is_empty() {
        println!("No results found. Try a different search/filter.");
        return;
    }
    for item in &data.items {
        let game = &item.game;
        println!(
            "{}{}\t{}\t{}\t{}",
            if item.favorite { "★ " } else { "" },
            game.id().unwrap_or_else(|| "?".to_string()),
            game.title().unwrap_or("Untitled"),
            game.genre().unwrap_or("Unknown"),
            platform_label(game.platform()),
        );
    }
    println!("\nShowing {shown} of {total} games.");
    if !data.suggestions.is_empty() {
        println!("suggestions: {}", data.suggestions.join(", "));
    }
}

fn print_game_human(game: &GameRecord, favorite: bool) {
    println!(
        "{} ({}){}",
        game.title().unwrap_or("Untitled"),
        game.id().unwrap_or_default(),
        if favorite { " ★" } else { "" }
    );
    println!(
        "{}",
        game.description()
            .or(game.short_description())
            .unwrap_or("No description.")
    );
    println!(
        "genre: {}\tplatform: {}\trelease: {}",
        game.genre().unwrap_or("Unknown"),
        platform_label(game.platform()),
        game.release_date().unwrap_or("Unknown")
    );
    println!(
        "publisher: {}\tdeveloper: {}",
        game.publisher().unwrap_or("Unknown"),
        game.developer().unwrap_or("Unknown")
    );
    if let Some(url) = game.game_url() {
        println!("url: {url}");
    }
    if let Some(thumb) = game.thumbnail() {
        println!("thumbnail: {thumb}");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn view_args(page: usize) -> ViewArgs {
        ViewArgs {
            search: None,
            favorites_only: false,
            page,
            page_size: 2,
        }
    }

    fn sample_payload() -> serde_json::Value {
        json!([
            {"id": 1, "title": "Warframe"},
            {"id": 2, "title": "War Thunder"},
            {"id": 3, "title": "Path of Exile"}
        ])
    }

    #[test]
    fn listing_marks_favorites_and_pages() {
        let favorites = BTreeSet::from(["2".to_string()]);
        let (data, pagination) = build_listing(view_args(1), favorites, sample_payload()).unwrap();

        assert_eq!(data.notice, None);
        let flags = data.items.iter().map(|i| i.favorite).collect::<Vec<_>>();
        assert_eq!(flags, [false, true]);
        assert_eq!((pagination.returned, pagination.total), (2, 3));
        assert!(pagination.has_more);
    }

    #[test]
    fn huge_page_number_returns_promptly() {
        let (data, pagination) =
            build_listing(view_args(usize::MAX), BTreeSet::new(), sample_payload()).unwrap();

        assert_eq!(data.items.len(), 3);
        assert_eq!(pagination.page, usize::MAX);
        assert!(!pagination.has_more);
    }

    #[test]
    fn messageless_no_result_uses_fallback_notice() {
        let (data, pagination) =
            build_listing(view_args(1), BTreeSet::new(), json!("Forbidden")).unwrap();

        assert_eq!(data.notice.as_deref(), Some(NO_RESULT_FALLBACK));
        assert!(data.items.is_empty());
        assert_eq!(pagination.total, 0);
    }

    #[test]
    fn api_message_becomes_notice() {
        let payload = json!({"status": 0, "message": "Invalid tag combination."});
        let (data, _) = build_listing(view_args(1), BTreeSet::new(), payload).unwrap();

        assert_eq!(data.notice.as_deref(), Some("Invalid tag combination."));
        assert!(data.items.is_empty());
    }

    #[test]
    fn invalid_search_is_rejected_before_listing() {
        let args = ViewArgs {
            search: Some("<script>".to_string()),
            ..view_args(1)
        };
        let err = build_listing(args, BTreeSet::new(), sample_payload()).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn non_object_details_are_unavailable() {
        for payload in [json!([]), json!("oops"), json!(null)] {
            let err = game_from_payload(payload).unwrap_err();
            assert_eq!(err.code(), "UPSTREAM_SCHEMA");
        }
    }

    #[test]
    fn details_without_id_report_api_message() {
        let payload = json!({"status": 0, "message": "Game not found"});
        let err = game_from_payload(payload).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().contains("Game not found"));

        let err = game_from_payload(json!({})).unwrap_err();
        assert_eq!(err.code(), "UPSTREAM_SCHEMA");
    }

    #[test]
    fn live_status_does_not_hide_details() {
        let payload = json!({"id": 452, "title": "Call Of Duty: Warzone", "status": "Live"});
        let game = game_from_payload(payload).unwrap();
        assert_eq!(game.id().as_deref(), Some("452"));
    }

    #[test]
    fn tags_csv_skips_blanks() {
        assert_eq!(parse_tags_csv(" 3d, ,mmorpg,,"), ["3d", "mmorpg"]);
        assert!(parse_tags_csv(" , ").is_empty());
    }
}
