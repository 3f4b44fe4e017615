use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service::errors::ServiceError;
use service::product_service::{self, ProductWithCategory};
use tracing::{error, info};

use crate::errors::JsonApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub name: Option<String>,
    /// `None` means the field was omitted; `Some(None)` is an explicit null
    /// that clears the stored description.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub category_id: Option<i32>,
}

fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

#[utoipa::path(
    post, path = "/products", tag = "products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Category Not Found"),
        (status = 500, description = "Create Failed")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> Result<(StatusCode, Json<ProductWithCategory>), JsonApiError> {
    let name = input.name.unwrap_or_default();
    let price = input.price.unwrap_or(0.0);
    let category_id = input.category_id.unwrap_or(0);
    match product_service::create_product(&state.db, &name, input.description, price, category_id).await {
        Ok(p) => {
            info!(id = p.id, category_id = p.category_id, "created product");
            Ok((StatusCode::CREATED, Json(p)))
        }
        Err(e) => match e {
            ServiceError::Validation(msg) => Err(JsonApiError::new(StatusCode::BAD_REQUEST, msg, None)),
            ServiceError::NotFound(msg) => Err(JsonApiError::new(StatusCode::NOT_FOUND, msg, None)),
            other => {
                error!(err = %other, "create product failed");
                Err(JsonApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to create product",
                    Some(other.to_string()),
                ))
            }
        },
    }
}

#[utoipa::path(
    get, path = "/products", tag = "products",
    responses(
        (status = 200, description = "List OK"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductWithCategory>>, JsonApiError> {
    match product_service::list_products(&state.db).await {
        Ok(list) => {
            info!(count = list.len(), "list products");
            Ok(Json(list))
        }
        Err(e) => {
            error!(err = %e, "list products failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to list products",
                Some(e.to_string()),
            ))
        }
    }
}

#[utoipa::path(
    get, path = "/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductWithCategory>, JsonApiError> {
    match product_service::get_product(&state.db, id).await {
        Ok(Some(p)) => Ok(Json(p)),
        Ok(None) => Err(JsonApiError::new(StatusCode::NOT_FOUND, "product not found", None)),
        Err(e) => {
            error!(err = %e, "get product failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to fetch product",
                Some(e.to_string()),
            ))
        }
    }
}

#[utoipa::path(
    put, path = "/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Update Failed")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateProductInput>,
) -> Result<Json<ProductWithCategory>, JsonApiError> {
    match product_service::update_product(
        &state.db,
        id,
        input.name.as_deref(),
        input.description,
        input.price,
        input.category_id,
    )
    .await
    {
        Ok(p) => {
            info!(id = p.id, "updated product");
            Ok(Json(p))
        }
        Err(e) => match e {
            ServiceError::NotFound(msg) => Err(JsonApiError::new(StatusCode::NOT_FOUND, msg, None)),
            other => {
                error!(err = %other, "update product failed");
                Err(JsonApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to update product",
                    Some(other.to_string()),
                ))
            }
        },
    }
}

#[utoipa::path(
    delete, path = "/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Delete Failed")
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    match product_service::delete_product(&state.db, id).await {
        Ok(true) => {
            info!(id, "deleted product");
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(JsonApiError::new(StatusCode::NOT_FOUND, "product not found", None)),
        Err(e) => {
            error!(err = %e, "delete product failed");
            Err(JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to delete product",
                Some(e.to_string()),
            ))
        }
    }
}
