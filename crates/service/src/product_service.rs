use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Serialize;

use models::category::{self, Entity as CategoryEntity};
use models::product::{self, Entity as ProductEntity};

use crate::errors::ServiceError;

/// Category fields embedded in product responses.
#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: i32,
    pub name: String,
}

/// A product joined with its owning category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: i32,
    pub category: Option<CategoryRef>,
}

impl ProductWithCategory {
    fn from_row((p, cat): (product::Model, Option<category::Model>)) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            category_id: p.category_id,
            category: cat.map(|c| CategoryRef { id: c.id, name: c.name }),
        }
    }
}

/// Create a product after validating required fields and the category
/// reference, then re-read it joined with the category so the response
/// carries the denormalized category data, not just the foreign key.
pub async fn create_product(
    db: &DatabaseConnection,
    name: &str,
    description: Option<String>,
    price: f64,
    category_id: i32,
) -> Result<ProductWithCategory, ServiceError> {
    if name.is_empty() || price == 0.0 || category_id == 0 {
        return Err(ServiceError::Validation(
            "name, price and categoryId are required".into(),
        ));
    }
    CategoryEntity::find_by_id(category_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("category"))?;

    let now = Utc::now().into();
    let am = product::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description),
        price: Set(price),
        category_id: Set(category_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    get_product(db, created.id)
        .await?
        .ok_or_else(|| ServiceError::Db("created product missing on re-read".into()))
}

/// List all products ordered by name, each joined with its category.
pub async fn list_products(
    db: &DatabaseConnection,
) -> Result<Vec<ProductWithCategory>, ServiceError> {
    let rows = ProductEntity::find()
        .find_also_related(CategoryEntity)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(ProductWithCategory::from_row).collect())
}

/// Get a product by id joined with its category.
pub async fn get_product(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<ProductWithCategory>, ServiceError> {
    let row = ProductEntity::find_by_id(id)
        .find_also_related(CategoryEntity)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(row.map(ProductWithCategory::from_row))
}

/// Apply a partial update. Merge rules follow the original surface exactly:
/// `name`, `price` and `category_id` only replace when the supplied value is
/// non-empty/non-zero, while `description` replaces whenever the field is
/// present, so an explicit null clears it. A supplied price of 0 is ignored
/// and the previous price kept.
pub async fn update_product(
    db: &DatabaseConnection,
    id: i32,
    name: Option<&str>,
    description: Option<Option<String>>,
    price: Option<f64>,
    category_id: Option<i32>,
) -> Result<ProductWithCategory, ServiceError> {
    let mut am: product::ActiveModel = ProductEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("product"))?
        .into();

    if let Some(cid) = category_id.filter(|&c| c != 0) {
        CategoryEntity::find_by_id(cid)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("category"))?;
        am.category_id = Set(cid);
    }
    if let Some(n) = name {
        if !n.is_empty() {
            am.name = Set(n.to_string());
        }
    }
    if let Some(d) = description {
        am.description = Set(d);
    }
    if let Some(p) = price {
        if p != 0.0 {
            am.price = Set(p);
        }
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    get_product(db, updated.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("product"))
}

/// Delete a product; returns true if a row was removed. Products are leaves,
/// so no referential guard is needed.
pub async fn delete_product(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = ProductEntity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
