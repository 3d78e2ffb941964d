//! Behaviour every `ProductRepository` implementation must share.

use catalog_core::domain::product::{Category, Price, Product, ProductId};
use catalog_core::errors::ValidationError;
use catalog_db::{
    connect_with_settings, migrations, InMemoryProductRepository, ProductFactory, ProductFilter,
    ProductRepository, RepositoryError, SqlProductRepository,
};

type StoreContractResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        match (&$left, &$right) {
            (left, right) => {
                if left != right {
                    return Err(format!(
                        "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                        left, right
                    ));
                }
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)*) => {
        match (&$left, &$right) {
            (left, right) => {
                if left != right {
                    return Err(format!($($arg)*));
                }
            }
        }
    };
}

fn price(raw: &str) -> StoreContractResult<Price> {
    raw.parse().map_err(|error| format!("price `{raw}` should parse: {error}"))
}

fn store_error(error: RepositoryError) -> String {
    format!("store call failed: {error}")
}

async fn sql_repository() -> StoreContractResult<SqlProductRepository> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate: {error}"))?;
    Ok(SqlProductRepository::new(pool))
}

async fn lifecycle(store: &dyn ProductRepository) -> StoreContractResult {
    let description = Some("A red hat".to_string());
    let mut fedora = Product::new("Fedora", description, price("12.50")?, true, Category::Cloths);
    let id = store.create(&mut fedora).await.map_err(store_error)?;
    require_eq!(fedora.id, Some(id), "create should write the id back");

    let found = store.find(id).await.map_err(store_error)?;
    require_eq!(found.as_ref(), Some(&fedora));

    let mut changed = fedora.clone();
    changed.description = Some("A blue hat".to_string());
    changed.price = price("14")?;
    require!(store.update(&changed).await.map_err(store_error)?, "update should hit the row");
    let found = store.find(id).await.map_err(store_error)?;
    require_eq!(found.as_ref().map(|product| product.id), Some(Some(id)));
    require_eq!(found.and_then(|product| product.description), Some("A blue hat".to_string()));

    require!(store.delete(id).await.map_err(store_error)?, "first delete removes the row");
    require!(!store.delete(id).await.map_err(store_error)?, "second delete is a no-op");
    let gone = store.find(id).await.map_err(store_error)?;
    require_eq!(gone, None::<Product>, "deleted product is still found");

    require!(!store.update(&changed).await.map_err(store_error)?, "update of a deleted row");
    Ok(())
}

async fn misuse_is_rejected(store: &dyn ProductRepository) -> StoreContractResult {
    let mut unsaved = Product::new("Wrench", None, price("8.00")?, true, Category::Tools);
    match store.update(&unsaved).await {
        Err(RepositoryError::Validation(ValidationError::UnsavedRecord)) => {}
        other => return Err(format!("expected unsaved-record error, got {other:?}")),
    }

    let id = store.create(&mut unsaved).await.map_err(store_error)?;
    match store.create(&mut unsaved).await {
        Err(RepositoryError::Validation(ValidationError::AlreadyPersisted(existing))) => {
            require_eq!(existing, id);
        }
        other => return Err(format!("expected already-persisted error, got {other:?}")),
    }

    let missing = store.find(ProductId(id.0 + 1000)).await.map_err(store_error)?;
    require_eq!(missing, None::<Product>);
    Ok(())
}

async fn filters_agree_with_counts(store: &dyn ProductRepository) -> StoreContractResult {
    let mut factory = ProductFactory::seeded(11);
    for mut product in factory.build_batch(25) {
        store.create(&mut product).await.map_err(store_error)?;
    }

    let all = store.all().await.map_err(store_error)?;
    require_eq!(all.len(), 25);
    require!(all.windows(2).all(|pair| pair[0].id < pair[1].id), "listing is ordered by id");

    for category in Category::ALL {
        let expected = all.iter().filter(|product| product.category == category).count();
        let found = store.find_by_category(category).await.map_err(store_error)?;
        require_eq!(found.len(), expected, "category {category} listed {} rows", found.len());
        let counted =
            store.count(&ProductFilter::Category(category)).await.map_err(store_error)?;
        require_eq!(counted, expected as u64);
    }

    let available = all.iter().filter(|product| product.available).count();
    require_eq!(store.find_by_availability(true).await.map_err(store_error)?.len(), available);

    let first = &all[0];
    let by_price = store.find_by_price(first.price).await.map_err(store_error)?;
    require!(by_price.iter().any(|product| product.id == first.id));
    require!(by_price.iter().all(|product| product.price == first.price));

    let by_name = store.find_by_name(&first.name).await.map_err(store_error)?;
    require!(by_name.iter().all(|product| product.name == first.name));
    Ok(())
}

#[tokio::test]
async fn sql_store_honours_contract() -> StoreContractResult {
    lifecycle(&sql_repository().await?).await?;
    misuse_is_rejected(&sql_repository().await?).await?;
    filters_agree_with_counts(&sql_repository().await?).await
}

#[tokio::test]
async fn in_memory_store_honours_contract() -> StoreContractResult {
    lifecycle(&InMemoryProductRepository::default()).await?;
    misuse_is_rejected(&InMemoryProductRepository::default()).await?;
    filters_agree_with_counts(&InMemoryProductRepository::default()).await
}
