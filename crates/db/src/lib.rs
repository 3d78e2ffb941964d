pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_with_settings, DbPool};
pub use fixtures::{seed_catalog, ProductFactory, SeedResult};
pub use repositories::{
    InMemoryProductRepository, ProductFilter, ProductRepository, RepositoryError,
    SqlProductRepository,
};
