use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

use models::category::{self, Entity as CategoryEntity};
use models::product::{self, Entity as ProductEntity};

use crate::errors::ServiceError;

/// Product fields exposed when listing categories.
#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub price: f64,
}

/// Product fields exposed on a single category.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct CategoryWithProducts {
    pub id: i32,
    pub name: String,
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    pub id: i32,
    pub name: String,
    pub products: Vec<ProductDetail>,
}

/// Create a category after validating the name. Duplicate names are allowed.
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<category::Model, ServiceError> {
    if name.is_empty() {
        return Err(ServiceError::Validation("category name is required".into()));
    }
    let now = Utc::now().into();
    let am = category::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

/// List all categories ordered by name, each with its products reduced to the
/// summary projection. An empty store yields an empty vec.
pub async fn list_categories(
    db: &DatabaseConnection,
) -> Result<Vec<CategoryWithProducts>, ServiceError> {
    let rows = CategoryEntity::find()
        .find_with_related(ProductEntity)
        .order_by_asc(category::Column::Name)
        .order_by_asc(category::Column::Id)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows
        .into_iter()
        .map(|(cat, products)| CategoryWithProducts {
            id: cat.id,
            name: cat.name,
            products: products
                .into_iter()
                .map(|p| ProductSummary { id: p.id, name: p.name, price: p.price })
                .collect(),
        })
        .collect())
}

/// Get a category by id with its products in the detail projection.
pub async fn get_category(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<CategoryDetail>, ServiceError> {
    let Some(cat) = CategoryEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
    else {
        return Ok(None);
    };
    let products = cat
        .find_related(ProductEntity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(Some(CategoryDetail {
        id: cat.id,
        name: cat.name,
        products: products
            .into_iter()
            .map(|p| ProductDetail {
                id: p.id,
                name: p.name,
                description: p.description,
                price: p.price,
            })
            .collect(),
    }))
}

/// Replace the category name. The name is overwritten even when the caller
/// sends nothing; an absent value becomes the empty string.
pub async fn update_category(
    db: &DatabaseConnection,
    id: i32,
    name: Option<String>,
) -> Result<category::Model, ServiceError> {
    let mut am: category::ActiveModel = CategoryEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("category"))?
        .into();
    am.name = Set(name.unwrap_or_default());
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

/// Delete a category. Blocked with `Conflict` while any product references it.
pub async fn delete_category(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let cat = CategoryEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("category"))?;

    let dependents = ProductEntity::find()
        .filter(product::Column::CategoryId.eq(id))
        .count(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if dependents > 0 {
        return Err(ServiceError::Conflict(
            "cannot delete category with associated products".into(),
        ));
    }

    cat.delete(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}
