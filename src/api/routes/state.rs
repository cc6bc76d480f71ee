use crate::database::Database;
use crate::pagination::PageUrlConfig;

/// Shared application state passed to all Axum handlers via `.with_state()`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub page_url: PageUrlConfig,
    pub default_take: i64,
}

impl AppState {
    pub fn new(db: Database, page_url: PageUrlConfig, default_take: i64) -> Self {
        Self {
            db,
            page_url,
            default_take,
        }
    }
}
