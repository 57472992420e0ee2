use clap::ValueEnum;
use url::Url;

use crate::error::AppError;

pub const DEFAULT_API_BASE: &str = "https://www.freetogame.com/api";
pub const MAX_FILTER_TAGS: usize = 6;

pub const TAGS: [&str; 45] = [
    "mmorpg",
    "shooter",
    "strategy",
    "moba",
    "racing",
    "sports",
    "social",
    "sandbox",
    "open-world",
    "survival",
    "pvp",
    "pve",
    "pixel",
    "voxel",
    "zombie",
    "turn-based",
    "first-person",
    "third-person",
    "top-down",
    "tank",
    "space",
    "sailing",
    "side-scroller",
    "superhero",
    "permadeath",
    "card",
    "battle-royale",
    "mmo",
    "mmofps",
    "mmotps",
    "3d",
    "2d",
    "anime",
    "fantasy",
    "sci-fi",
    "fighting",
    "action-rpg",
    "action",
    "military",
    "martial-arts",
    "flight",
    "low-spec",
    "tower-defense",
    "horror",
    "mmorts",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Platform {
    #[default]
    All,
    Pc,
    Browser,
}

impl Platform {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pc => "pc",
            Self::Browser => "browser",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortBy {
    #[default]
    Relevance,
    Popularity,
    ReleaseDate,
    Alphabetical,
}

impl SortBy {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Popularity => "popularity",
            Self::ReleaseDate => "release-date",
            Self::Alphabetical => "alphabetical",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub platform: Platform,
    pub category: Option<String>,
    pub sort_by: SortBy,
}

#[derive(Debug, Clone)]
pub struct FilterQuery {
    tags: Vec<String>,
    pub platform: Platform,
    pub sort_by: SortBy,
}

impl FilterQuery {
    /// Keeps the first occurrence of each tag, in order.
    pub fn new(tags: &[String], platform: Platform, sort_by: SortBy) -> Result<Self, AppError> {
        let mut unique: Vec<String> = Vec::new();
        for tag in tags {
            let tag = validate_tag(tag)?;
            if !unique.iter().any(|t| t == &tag) {
                unique.push(tag);
            }
        }
        if unique.is_empty() {
            return Err(AppError::InvalidArgument("select at least 1 tag".to_string()));
        }
        if unique.len() > MAX_FILTER_TAGS {
            return Err(AppError::InvalidArgument(format!("max {MAX_FILTER_TAGS} tags")));
        }
        Ok(Self {
            tags: unique,
            platform,
            sort_by,
        })
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

pub fn validate_tag(raw: &str) -> Result<String, AppError> {
    let tag = raw.trim().to_lowercase();
    if TAGS.contains(&tag.as_str()) {
        Ok(tag)
    } else {
        Err(AppError::InvalidArgument(format!(
            "unknown tag '{}'; run `f2p-cli tags` for the list",
            raw.trim()
        )))
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn games(&self, query: &CatalogQuery) -> Result<String, AppError> {
        let mut url = self.url("games")?;
        {
            let mut qp = url.query_pairs_mut();
            if query.platform != Platform::All {
                qp.append_pair("platform", query.platform.as_param());
            }
            if let Some(category) = &query.category {
                qp.append_pair("category", category);
            }
            qp.append_pair("sort-by", query.sort_by.as_param());
        }
        Ok(url.into())
    }

    pub fn filter(&self, query: &FilterQuery) -> Result<String, AppError> {
        let mut url = self.url("filter")?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("tag", &query.tags.join("."));
            if query.platform != Platform::All {
                qp.append_pair("platform", query.platform.as_param());
            }
            qp.append_pair("sort", query.sort_by.as_param());
        }
        Ok(url.into())
    }

    pub fn game(&self, id: u64) -> Result<String, AppError> {
        let mut url = self.url("game")?;
        url.query_pairs_mut().append_pair("id", &id.to_string());
        Ok(url.into())
    }

    fn url(&self, endpoint: &str) -> Result<Url, AppError> {
        Url::parse(&format!("{}/{endpoint}", self.base)).map_err(|e| {
            AppError::InvalidArgument(format!("invalid api base '{}': {e}", self.base))
        })
    }
}
