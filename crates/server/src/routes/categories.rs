use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service::category_service::{self, CategoryDetail, CategoryWithProducts};
use service::errors::ServiceError;
use tracing::{error, info};

use crate::errors::JsonApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CategoryInput {
    pub name: Option<String>,
}

#[utoipa::path(
    post, path = "/categories", tag = "categories",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 500, description = "Create Failed")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<models::category::Model>), JsonApiError> {
    let name = input.name.unwrap_or_default();
    match category_service::create_category(&state.db, &name).await {
        Ok(m) => {
            info!(id = m.id, name = %m.name, "created category");
            Ok((StatusCode::CREATED, Json(m)))
        }
        Err(e) => match e {
            ServiceError::Validation(msg) => Err(JsonApiError::new(StatusCode::BAD_REQUEST, msg, None)),
            other => {
                error!(err = %other, "create category failed");
                Err(JsonApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to create category",
                    Some(other.to_string()),
                ))
            }
        },
    }
}

#[utoipa::path(
    get, path = "/categories", tag = "categories",
    responses(
        (status = 200, description = "List OK"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryWithProducts>>, JsonApiError> {
    match category_service::list_categories(&state.db).await {
        Ok(list) => {
            info!(count = list.len(), "list categories");
            Ok(Json(list))
        }
        Err(e) => {
            error!(err = %e, "list categories failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to list categories",
                Some(e.to_string()),
            ))
        }
    }
}

#[utoipa::path(
    get, path = "/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryDetail>, JsonApiError> {
    match category_service::get_category(&state.db, id).await {
        Ok(Some(c)) => Ok(Json(c)),
        Ok(None) => Err(JsonApiError::new(StatusCode::NOT_FOUND, "category not found", None)),
        Err(e) => {
            error!(err = %e, "get category failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to fetch category",
                Some(e.to_string()),
            ))
        }
    }
}

#[utoipa::path(
    put, path = "/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Update Failed")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<models::category::Model>, JsonApiError> {
    match category_service::update_category(&state.db, id, input.name).await {
        Ok(m) => {
            info!(id = m.id, "updated category");
            Ok(Json(m))
        }
        Err(e) => match e {
            ServiceError::NotFound(msg) => Err(JsonApiError::new(StatusCode::NOT_FOUND, msg, None)),
            other => {
                error!(err = %other, "update category failed");
                Err(JsonApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to update category",
                    Some(other.to_string()),
                ))
            }
        },
    }
}

#[utoipa::path(
    delete, path = "/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Dependent Products Exist"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Delete Failed")
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    match category_service::delete_category(&state.db, id).await {
        Ok(()) => {
            info!(id, "deleted category");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => match e {
            ServiceError::NotFound(msg) => Err(JsonApiError::new(StatusCode::NOT_FOUND, msg, None)),
            // Delete blocked by dependents maps to 400, matching the surface
            ServiceError::Conflict(msg) => Err(JsonApiError::new(StatusCode::BAD_REQUEST, msg, None)),
            other => {
                error!(err = %other, "delete category failed");
                Err(JsonApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to delete category",
                    Some(other.to_string()),
                ))
            }
        },
    }
}
