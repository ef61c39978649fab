//! Request handlers: validate, call the repository, shape the response.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use longbox_http::error::AppError;
use longbox_kernel::settings::InventorySettings;

use super::{
    error::ComicError,
    models::ComicBook,
    query::{InventoryParams, InventoryQuery},
    repository::ComicRepository,
    response::{
        ApiResponse, InventoryPage, CREATED_MESSAGE, DELETED_MESSAGE, DETAILS_MESSAGE,
        INVENTORY_MESSAGE, UPDATED_MESSAGE,
    },
    validation::{self, ValidationRules},
};

/// Shared by every handler of the module.
#[derive(Clone)]
pub struct ComicsState {
    pub repository: Arc<dyn ComicRepository>,
    pub inventory: InventorySettings,
}

type HandlerResult<T> = Result<T, ComicError>;

fn path_id(path: Result<Path<String>, PathRejection>) -> HandlerResult<String> {
    let Path(raw) = path.map_err(|rejection| ComicError::InvalidRequest(rejection.body_text()))?;
    Ok(raw)
}

fn require_id(raw: &str) -> HandlerResult<&str> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ComicError::MissingIdentifier);
    }
    Ok(id)
}

pub async fn create_comic(
    State(state): State<ComicsState>,
    body: Bytes,
) -> HandlerResult<(StatusCode, Json<ApiResponse<ComicBook>>)> {
    let new_comic = validation::validate_create(&body, &ValidationRules::current())?;
    let comic = state.repository.create(new_comic).await?;

    tracing::info!(comic_id = %comic.id, name = %comic.name, "comic book created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data(CREATED_MESSAGE, comic)),
    ))
}

pub async fn edit_comic(
    State(state): State<ComicsState>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> HandlerResult<Json<ApiResponse<ComicBook>>> {
    let comic_id = path_id(path)?;
    let id = require_id(&comic_id)?;
    let patch = validation::validate_edit(&body, &ValidationRules::current())?;

    let comic = state
        .repository
        .update(id, patch)
        .await?
        .ok_or_else(|| ComicError::NotFound(id.to_string()))?;

    tracing::info!(comic_id = %comic.id, "comic book updated");
    Ok(Json(ApiResponse::with_data(UPDATED_MESSAGE, comic)))
}

pub async fn delete_comic(
    State(state): State<ComicsState>,
    path: Result<Path<String>, PathRejection>,
) -> HandlerResult<Json<ApiResponse<()>>> {
    let comic_id = path_id(path)?;
    let id = require_id(&comic_id)?;

    let comic = state
        .repository
        .delete(id)
        .await?
        .ok_or_else(|| ComicError::NotFound(id.to_string()))?;

    tracing::info!(comic_id = %comic.id, "comic book deleted");
    Ok(Json(ApiResponse::message(DELETED_MESSAGE)))
}

pub async fn get_comic(
    State(state): State<ComicsState>,
    path: Result<Path<String>, PathRejection>,
) -> HandlerResult<Json<ApiResponse<ComicBook>>> {
    let comic_id = path_id(path)?;
    let id = require_id(&comic_id)?;

    let comic = state
        .repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ComicError::NotFound(id.to_string()))?;

    Ok(Json(ApiResponse::with_data(DETAILS_MESSAGE, comic)))
}

pub async fn list_inventory(
    State(state): State<ComicsState>,
    query: Result<Query<InventoryParams>, QueryRejection>,
) -> HandlerResult<Json<InventoryPage>> {
    let Query(params) =
        query.map_err(|rejection| ComicError::InvalidRequest(rejection.body_text()))?;
    let query = InventoryQuery::from_params(&params, &state.inventory)?;

    // Count and page are separate reads; concurrent writes may skew them.
    let data = state.repository.find(&query).await?;
    let total = state.repository.count(&query.filter).await?;

    tracing::debug!(
        total,
        page = query.pagination.page(),
        returned = data.len(),
        "inventory listed"
    );

    Ok(Json(InventoryPage {
        message: INVENTORY_MESSAGE,
        data,
        total,
        page: query.pagination.page(),
        pages: query.pagination.total_pages(total),
    }))
}

/// Methods a route does not serve answer like an unknown route.
pub async fn unsupported_method() -> AppError {
    AppError::not_found("Route not found")
}

/// Item routes reached without an identifier segment.
pub async fn missing_identifier() -> ComicError {
    ComicError::MissingIdentifier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identifiers_are_missing() {
        assert!(matches!(require_id(""), Err(ComicError::MissingIdentifier)));
        assert!(matches!(require_id("  "), Err(ComicError::MissingIdentifier)));
        assert_eq!(require_id(" abc ").unwrap(), "abc");
    }
}
