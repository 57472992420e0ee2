use serde::Serialize;

use crate::normalize::GameRecord;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    LocalDb,
    FreeToGame,
    Internal,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub returned: usize,
    pub has_more: bool,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    pub version: &'static str,
    pub source: DataSource,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub ok: bool,
    pub data: Option<T>,
    pub pagination: Option<Pagination>,
    pub meta: Meta,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameListItem {
    pub favorite: bool,
    pub game: GameRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteChange {
    pub id: String,
    pub favorite: bool,
    pub changed: bool,
}
