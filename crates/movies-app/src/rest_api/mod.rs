pub mod movie;
mod paging;

pub use paging::{Page, Paging};

use crate::state::AppState;

pub fn api_router() -> axum::Router<AppState> {
    axum::Router::new().nest("/movie", movie::router())
}
