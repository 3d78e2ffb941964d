use async_trait::async_trait;
use thiserror::Error;

use catalog_core::domain::product::{Category, Price, Product, ProductId};
use catalog_core::errors::{ApplicationError, ValidationError};

pub mod memory;
pub mod product;

pub use memory::InMemoryProductRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Validation(error) => Self::Validation(error),
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// The single equality filter a listing may apply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProductFilter {
    #[default]
    All,
    Name(String),
    Category(Category),
    Availability(bool),
    Price(Price),
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Name(name) => product.name == *name,
            Self::Category(category) => product.category == *category,
            Self::Availability(available) => product.available == *available,
            Self::Price(price) => product.price == *price,
        }
    }
}

/// Persistence boundary for products.
///
/// Lookups report absence as `None` or an empty list, never as an error. Each
/// write runs in its own transaction.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Matching products ordered by id, read in one statement.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError>;

    async fn count(&self, filter: &ProductFilter) -> Result<u64, RepositoryError>;

    /// Inserts an unsaved product and stores the assigned id back into it.
    async fn create(&self, product: &mut Product) -> Result<ProductId, RepositoryError>;

    /// Returns `false` when no row carries the product's id.
    async fn update(&self, product: &Product) -> Result<bool, RepositoryError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;

    async fn all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.list(&ProductFilter::All).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, RepositoryError> {
        self.list(&ProductFilter::Name(name.to_string())).await
    }

    async fn find_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.list(&ProductFilter::Category(category)).await
    }

    async fn find_by_availability(
        &self,
        available: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.list(&ProductFilter::Availability(available)).await
    }

    async fn find_by_price(&self, price: Price) -> Result<Vec<Product>, RepositoryError> {
        self.list(&ProductFilter::Price(price)).await
    }
}

pub(crate) fn ensure_creatable(product: &Product) -> Result<(), ValidationError> {
    if let Some(id) = product.id {
        return Err(ValidationError::AlreadyPersisted(id));
    }
    product.validate()
}

pub(crate) fn ensure_updatable(product: &Product) -> Result<ProductId, ValidationError> {
    let id = product.id.ok_or(ValidationError::UnsavedRecord)?;
    product.validate()?;
    Ok(id)
}
