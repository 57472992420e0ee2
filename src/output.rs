use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::AppError;
use crate::models::{DataSource, Envelope, ErrorBody, Meta, Pagination};
use crate::view::ViewState;

const ENVELOPE_VERSION: &str = "1.0.0";

pub fn clamp_page_size(page_size: usize) -> usize {
    page_size.clamp(1, 100)
}

pub fn build_pagination(view: &ViewState) -> Pagination {
    Pagination {
        page: view.page,
        page_size: view.page_size,
        returned: view.visible().len(),
        has_more: view.has_more(),
        total: view.total(),
    }
}

pub fn print_success<T: Serialize>(
    format: OutputFormat,
    data: T,
    pagination: Option<Pagination>,
    source: DataSource,
    human: impl FnOnce(&T),
) {
    match format {
        OutputFormat::Human => human(&data),
        OutputFormat::Json => {
            let envelope = Envelope {
                ok: true,
                data: Some(data),
                pagination,
                meta: Meta {
                    version: ENVELOPE_VERSION,
                    source,
                    cached: false,
                },
                error: None,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

pub fn print_error(format: OutputFormat, error: AppError) {
    match format {
        OutputFormat::Human => {
            eprintln!("Error [{}]: {}", error.code(), error);
        }
        OutputFormat::Json => {
            let envelope: Envelope<serde_json::Value> = Envelope {
                ok: false,
                data: None,
                pagination: None,
                meta: Meta {
                    version: ENVELOPE_VERSION,
                    source: DataSource::Internal,
                    cached: false,
                },
                error: Some(ErrorBody {
                    code: error.code(),
                    message: error.to_string(),
                }),
            };
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use super::*;
    use crate::normalize::GameRecord;

    #[test]
    fn pagination_reflects_view() {
        let mut view = ViewState::new(String::new(), false, BTreeSet::new(), 2);
        view.set_games(
            (1..=3)
                .map(|id| GameRecord::new(json!({"id": id, "title": "t"})))
                .collect(),
        );

        let p = build_pagination(&view);
        assert_eq!((p.page, p.returned, p.total, p.has_more), (1, 2, 3, true));

        view.load_more();
        let p = build_pagination(&view);
        assert_eq!((p.page, p.returned, p.has_more), (2, 3, false));
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(clamp_page_size(0), 1);
        assert_eq!(clamp_page_size(24), 24);
        assert_eq!(clamp_page_size(1000), 100);
    }
}
