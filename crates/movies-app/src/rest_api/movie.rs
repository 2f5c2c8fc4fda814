use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json,
};
use http::StatusCode;
use movies_dal::{
    genre::Genre,
    movie::MovieRepository,
    validation::MovieInput,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::ApiResult,
    repository_from_request,
    rest_api::{Page, Paging},
    state::AppState,
    validate::Garde,
};

repository_from_request!(MovieRepository);

#[derive(Debug, Deserialize)]
pub struct CountFilter {
    genre: Option<Genre>,
}

pub async fn list(
    repository: MovieRepository,
    State(state): State<AppState>,
    Garde(Query(paging)): Garde<Query<Paging>>,
) -> ApiResult<impl IntoResponse> {
    let default_page_size = state.config().default_page_size;
    let page_size = paging.page_size(default_page_size);
    let genre = paging.genre();
    let listing_params = paging.into_listing_params(default_page_size)?;
    let batch = repository.list(listing_params, genre).await?;
    let page = Page::try_from_batch(batch, page_size)?;
    Ok((StatusCode::OK, Json(page)))
}

pub async fn count(
    repository: MovieRepository,
    Query(filter): Query<CountFilter>,
) -> ApiResult<impl IntoResponse> {
    let count = repository.count(filter.genre).await?;
    Ok((StatusCode::OK, Json(count)))
}

pub async fn get_movie(
    Path(id): Path<i64>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id).await?;
    Ok((StatusCode::OK, Json(record)))
}

pub async fn create(
    repository: MovieRepository,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let payload = MovieInput::from_json(body)?.validate_create(state.today())?;
    let record = repository.create(payload).await?;
    debug!("Created movie {} with id {}", record.title, record.id);

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    Path(id): Path<i64>,
    repository: MovieRepository,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let payload = MovieInput::from_json(body)?.validate_create(state.today())?;
    let record = repository.update(id, payload).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn partial_update(
    Path(id): Path<i64>,
    repository: MovieRepository,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let existing = repository.get(id).await?;
    let patch = MovieInput::from_json(body)?.validate_partial(state.today())?;
    if patch.is_empty() {
        return Ok((StatusCode::OK, Json(existing)));
    }
    let record = repository.update(id, patch.apply(existing)).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(
    Path(id): Path<i64>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id).await?;

    Ok((StatusCode::NO_CONTENT, ()))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route("/count", get(count))
        .route(
            "/{id}",
            get(get_movie)
                .put(update)
                .patch(partial_update)
                .delete(delete),
        )
}
