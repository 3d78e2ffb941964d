pub mod bootstrap;
pub mod health;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{response::Html, routing::get, Router};
use catalog_db::ProductRepository;
use tower_http::services::ServeDir;

const INDEX_PAGE: &str = include_str!("../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ProductRepository>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(repository: Arc<dyn ProductRepository>, static_dir: impl Into<PathBuf>) -> Self {
        Self { repository, static_dir: static_dir.into() }
    }
}

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health::health))
        .merge(routes::router())
        .nest_service("/static", static_files)
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}
