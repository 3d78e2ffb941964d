use std::collections::BTreeMap;

use tokio::sync::RwLock;

use catalog_core::domain::product::{Product, ProductId};

use super::{
    ensure_creatable, ensure_updatable, ProductFilter, ProductRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryProductRepository {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    products: BTreeMap<i64, Product>,
    last_id: i64,
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.get(&id.0).cloned())
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.values().filter(|product| filter.matches(product)).cloned().collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.values().filter(|product| filter.matches(product)).count() as u64)
    }

    async fn create(&self, product: &mut Product) -> Result<ProductId, RepositoryError> {
        ensure_creatable(product)?;

        let mut state = self.state.write().await;
        state.last_id += 1;
        let id = ProductId(state.last_id);
        product.id = Some(id);
        state.products.insert(id.0, product.clone());
        Ok(id)
    }

    async fn update(&self, product: &Product) -> Result<bool, RepositoryError> {
        let id = ensure_updatable(product)?;

        let mut state = self.state.write().await;
        match state.products.get_mut(&id.0) {
            Some(stored) => {
                *stored = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.products.remove(&id.0).is_some())
    }
}
