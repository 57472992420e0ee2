use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::normalize::GameRecord;

pub const DEFAULT_PAGE_SIZE: usize = 24;
pub const MAX_SUGGESTIONS: usize = 6;

static SEARCH_ALLOWED: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r#"^[a-zA-Z0-9\s\-:'".,!()&]+$"#));

/// Trimmed search text, or an error if it contains disallowed characters.
pub fn validate_search(raw: &str) -> Result<String, AppError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    let re = SEARCH_ALLOWED
        .as_ref()
        .map_err(|e| AppError::Internal(format!("search pattern: {e}")))?;
    if !re.is_match(value) {
        return Err(AppError::InvalidArgument(
            "Invalid input: use letters/numbers/spaces only.".to_string(),
        ));
    }
    Ok(value.to_string())
}

pub fn platform_label(platform: Option<&str>) -> String {
    let Some(text) = platform else {
        return "Unknown".to_string();
    };
    let p = text.to_lowercase();
    let windows = p.contains("windows");
    let browser = p.contains("web browser");
    match (windows, browser) {
        (true, true) => "PC + Browser".to_string(),
        (false, true) => "Browser".to_string(),
        (true, false) => "PC".to_string(),
        (false, false) => text.to_string(),
    }
}

/// Client-side listing state: the full fetched list plus the filtered,
/// paginated view over it.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub search: String,
    pub favorites_only: bool,
    pub favorites: BTreeSet<String>,
    pub page_size: usize,
    pub page: usize,
    all_games: Vec<GameRecord>,
    view_games: Vec<GameRecord>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            favorites_only: false,
            favorites: BTreeSet::new(),
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
            all_games: Vec::new(),
            view_games: Vec::new(),
        }
    }
}

impl ViewState {
    pub fn new(
        search: String,
        favorites_only: bool,
        favorites: BTreeSet<String>,
        page_size: usize,
    ) -> Self {
        Self {
            search,
            favorites_only,
            favorites,
            page_size,
            ..Self::default()
        }
    }

    pub fn set_games(&mut self, games: Vec<GameRecord>) {
        self.all_games = games;
        self.apply_filters();
    }

    pub fn clear_games(&mut self) {
        self.all_games.clear();
        self.view_games.clear();
        self.page = 1;
    }

    pub fn apply_filters(&mut self) {
        let q = self.search.to_lowercase();
        self.view_games = self
            .all_games
            .iter()
            .filter(|g| {
                !self.favorites_only
                    || g.id().is_some_and(|id| self.favorites.contains(&id))
            })
            .filter(|g| q.is_empty() || title_matches(g, &q))
            .cloned()
            .collect();
        self.page = 1;
    }

    pub fn visible_count(&self) -> usize {
        self.page.max(1).saturating_mul(self.page_size.max(1))
    }

    pub fn visible(&self) -> &[GameRecord] {
        let end = self.visible_count().min(self.view_games.len());
        &self.view_games[..end]
    }

    pub fn total(&self) -> usize {
        self.view_games.len()
    }

    pub fn has_more(&self) -> bool {
        self.visible_count() < self.view_games.len()
    }

    pub fn load_more(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Jumps straight to a 1-based page; the visible window saturates.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Title matches from the unfiltered list, for queries of two or more
    /// characters.
    pub fn suggestions(&self) -> Vec<&GameRecord> {
        let q = self.search.to_lowercase();
        if q.chars().count() < 2 {
            return Vec::new();
        }
        self.all_games
            .iter()
            .filter(|g| title_matches(g, &q))
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

fn title_matches(game: &GameRecord, lowered_query: &str) -> bool {
    game.title()
        .unwrap_or_default()
        .to_lowercase()
        .contains(lowered_query)
}
