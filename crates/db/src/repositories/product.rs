use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::debug;

use catalog_core::domain::product::{Category, Price, Product, ProductId};

use super::{
    ensure_creatable, ensure_updatable, ProductFilter, ProductRepository, RepositoryError,
};
use crate::DbPool;

const SELECT_PRODUCT: &str =
    "SELECT id, name, description, price, available, category FROM product";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    match filter {
        ProductFilter::All => {}
        ProductFilter::Name(name) => {
            builder.push(" WHERE name = ").push_bind(name.clone());
        }
        ProductFilter::Category(category) => {
            builder.push(" WHERE category = ").push_bind(category.as_str());
        }
        ProductFilter::Availability(available) => {
            builder.push(" WHERE available = ").push_bind(*available);
        }
        // Stored prices always carry two decimals, so text equality is decimal equality.
        ProductFilter::Price(price) => {
            builder.push(" WHERE price = ").push_bind(price.to_string());
        }
    }
}

fn row_to_product(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let decode = |error: sqlx::Error| RepositoryError::Decode(error.to_string());
    let id: i64 = row.try_get("id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let description: Option<String> = row.try_get("description").map_err(decode)?;
    let price_str: String = row.try_get("price").map_err(decode)?;
    let available: bool = row.try_get("available").map_err(decode)?;
    let category_str: String = row.try_get("category").map_err(decode)?;

    let price = price_str.parse::<Price>().map_err(|e| {
        RepositoryError::Decode(format!("product {id} has an unreadable price: {e}"))
    })?;
    let category = category_str.parse::<Category>().map_err(|e| {
        RepositoryError::Decode(format!("product {id} has an unreadable category: {e}"))
    })?;

    Ok(Product { id: Some(ProductId(id)), name, description, price, available, category })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_PRODUCT} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_PRODUCT);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM product");
        push_filter(&mut builder, filter);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn create(&self, product: &mut Product) -> Result<ProductId, RepositoryError> {
        ensure_creatable(product)?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "INSERT INTO product (name, description, price, available, category)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(product.available)
        .bind(product.category.as_str())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let id = ProductId(result.last_insert_rowid());
        product.id = Some(id);
        debug!(event_name = "db.product.created", product_id = %id, name = %product.name);
        Ok(id)
    }

    async fn update(&self, product: &Product) -> Result<bool, RepositoryError> {
        let id = ensure_updatable(product)?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE product
             SET name = ?, description = ?, price = ?, available = ?, category = ?
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(product.available)
        .bind(product.category.as_str())
        .bind(id.0)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let updated = result.rows_affected() > 0;
        debug!(event_name = "db.product.updated", product_id = %id, updated);
        Ok(updated)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM product WHERE id = ?").bind(id.0).execute(&self.pool).await?;

        let deleted = result.rows_affected() > 0;
        debug!(event_name = "db.product.deleted", product_id = %id, deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use catalog_core::domain::product::{Category, Price, Product, ProductId};
    use catalog_core::errors::ValidationError;

    use super::SqlProductRepository;
    use crate::fixtures::ProductFactory;
    use crate::repositories::{ProductFilter, ProductRepository, RepositoryError};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> (DbPool, SqlProductRepository) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        (pool.clone(), SqlProductRepository::new(pool))
    }

    async fn create_batch(
        repo: &SqlProductRepository,
        seed: u64,
        count: usize,
    ) -> Vec<Product> {
        let mut products = ProductFactory::seeded(seed).build_batch(count);
        for product in &mut products {
            repo.create(product).await.expect("create product");
        }
        products
    }

    #[tokio::test]
    async fn create_assigns_id_and_persists_every_field() {
        let (pool, repo) = setup().await;
        assert!(repo.all().await.expect("all").is_empty());

        let mut product = ProductFactory::seeded(1).build();
        let id = repo.create(&mut product).await.expect("create");

        assert_eq!(product.id, Some(id));
        let products = repo.all().await.expect("all");
        assert_eq!(products, vec![product]);

        pool.close().await;
    }

    #[tokio::test]
    async fn find_returns_created_product_or_none() {
        let (pool, repo) = setup().await;
        let mut product = Product::new(
            "Fedora",
            Some("A red hat".to_string()),
            Price::try_from(12.5).expect("price"),
            true,
            Category::Cloths,
        );
        let id = repo.create(&mut product).await.expect("create");

        let found = repo.find(id).await.expect("find").expect("product should exist");
        assert_eq!(found, product);
        assert_eq!(found.price.to_string(), "12.50");
        assert_eq!(repo.find(ProductId(id.0 + 100)).await.expect("find missing"), None);

        pool.close().await;
    }

    #[tokio::test]
    async fn create_rejects_saved_and_invalid_products() {
        let (pool, repo) = setup().await;

        let mut saved = ProductFactory::seeded(2).build();
        saved.id = Some(ProductId(41));
        assert!(matches!(
            repo.create(&mut saved).await,
            Err(RepositoryError::Validation(ValidationError::AlreadyPersisted(ProductId(41))))
        ));

        let mut nameless = ProductFactory::seeded(3).build();
        nameless.name = String::new();
        assert!(matches!(
            repo.create(&mut nameless).await,
            Err(RepositoryError::Validation(ValidationError::EmptyName))
        ));
        assert_eq!(nameless.id, None);
        assert_eq!(repo.count(&ProductFilter::All).await.expect("count"), 0);

        pool.close().await;
    }

    #[tokio::test]
    async fn update_preserves_identity_and_persists_new_values() {
        let (pool, repo) = setup().await;
        let mut product = ProductFactory::seeded(4).build();
        let original_id = repo.create(&mut product).await.expect("create");

        product.description = Some("new description string".to_string());
        product.price = "1.25".parse().expect("price");
        assert!(repo.update(&product).await.expect("update"));

        assert_eq!(product.id, Some(original_id));
        let products = repo.all().await.expect("all");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, Some(original_id));
        assert_eq!(products[0].description.as_deref(), Some("new description string"));
        assert_eq!(products[0].price.to_string(), "1.25");

        pool.close().await;
    }

    #[tokio::test]
    async fn update_of_unsaved_product_is_a_validation_error() {
        let (pool, repo) = setup().await;
        let product = ProductFactory::seeded(5).build();

        assert!(matches!(
            repo.update(&product).await,
            Err(RepositoryError::Validation(ValidationError::UnsavedRecord))
        ));

        pool.close().await;
    }

    #[tokio::test]
    async fn update_of_missing_row_reports_no_change() {
        let (pool, repo) = setup().await;
        let mut product = ProductFactory::seeded(6).build();
        product.id = Some(ProductId(999));

        assert!(!repo.update(&product).await.expect("update"));
        assert_eq!(repo.count(&ProductFilter::All).await.expect("count"), 0);

        pool.close().await;
    }

    #[tokio::test]
    async fn delete_removes_row_and_is_idempotent() {
        let (pool, repo) = setup().await;
        let mut product = ProductFactory::seeded(7).build();
        let id = repo.create(&mut product).await.expect("create");
        assert_eq!(repo.all().await.expect("all").len(), 1);

        assert!(repo.delete(id).await.expect("delete"));
        assert!(repo.all().await.expect("all").is_empty());
        assert!(!repo.delete(id).await.expect("second delete"));
        assert!(!repo.delete(ProductId(12345)).await.expect("delete unknown"));

        pool.close().await;
    }

    #[tokio::test]
    async fn list_all_returns_every_product_in_id_order() {
        let (pool, repo) = setup().await;
        let created = create_batch(&repo, 8, 5).await;

        let products = repo.all().await.expect("all");
        assert_eq!(products.len(), 5);
        assert_eq!(products, created);

        pool.close().await;
    }

    #[tokio::test]
    async fn find_by_name_returns_exactly_matching_products() {
        let (pool, repo) = setup().await;
        let created = create_batch(&repo, 9, 5).await;
        let name = created[0].name.clone();
        let expected = created.iter().filter(|p| p.name == name).count();

        let found = repo.find_by_name(&name).await.expect("find by name");
        assert_eq!(found.len(), expected);
        assert!(found.iter().all(|p| p.name == name));
        let filter = ProductFilter::Name(name);
        assert_eq!(repo.count(&filter).await.expect("count"), expected as u64);

        pool.close().await;
    }

    #[tokio::test]
    async fn find_by_category_returns_exactly_matching_products() {
        let (pool, repo) = setup().await;
        let created = create_batch(&repo, 10, 15).await;
        let category = created[0].category;
        let expected = created.iter().filter(|p| p.category == category).count();

        let found = repo.find_by_category(category).await.expect("find by category");
        assert_eq!(found.len(), expected);
        assert!(found.iter().all(|p| p.category == category));

        pool.close().await;
    }

    #[tokio::test]
    async fn find_by_availability_returns_exactly_matching_products() {
        let (pool, repo) = setup().await;
        let created = create_batch(&repo, 11, 10).await;
        let available = created[0].available;
        let expected = created.iter().filter(|p| p.available == available).count();

        let found = repo.find_by_availability(available).await.expect("find by availability");
        assert_eq!(found.len(), expected);
        assert!(found.iter().all(|p| p.available == available));

        pool.close().await;
    }

    #[tokio::test]
    async fn find_by_price_accepts_numeric_and_string_forms() {
        let (pool, repo) = setup().await;
        let mut created = create_batch(&repo, 12, 5).await;
        let mut twin = Product::new("Twin", None, created[0].price, false, Category::Food);
        repo.create(&mut twin).await.expect("create twin");
        created.push(twin);

        let price = created[0].price;
        let expected = created.iter().filter(|p| p.price == price).count();
        assert!(expected >= 2);

        let as_number = Price::try_from(
            price.amount().to_string().parse::<f64>().expect("price as float"),
        )
        .expect("numeric price");
        let as_string: Price = price.to_string().parse().expect("string price");

        let by_number = repo.find_by_price(as_number).await.expect("find by numeric price");
        let by_string = repo.find_by_price(as_string).await.expect("find by string price");

        assert_eq!(by_number.len(), expected);
        assert_eq!(by_number, by_string);
        assert!(by_number.iter().all(|p| p.price == price));

        pool.close().await;
    }

    #[tokio::test]
    async fn unreadable_rows_surface_as_decode_errors() {
        let (pool, repo) = setup().await;
        sqlx::query(
            "INSERT INTO product (name, description, price, available, category)
             VALUES ('Broken', NULL, 'twelve', 1, 'FOOD')",
        )
        .execute(&pool)
        .await
        .expect("insert raw row");

        assert!(matches!(repo.all().await, Err(RepositoryError::Decode(_))));

        pool.close().await;
    }
}
