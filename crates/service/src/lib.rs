//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates request mapping from data access.
//! - Owns the projections exposed over the wire.
//! - Classifies every store fault into a `ServiceError` before it reaches the caller.

pub mod category_service;
pub mod errors;
pub mod product_service;
#[cfg(test)]
pub mod test_support;
