use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use catalog_core::domain::product::{Category, Price, Product};

use crate::connection::DbPool;
use crate::repositories::{
    ProductFilter, ProductRepository, RepositoryError, SqlProductRepository,
};

const FACTORY_NAMES: &[&str] = &[
    "Hat", "Pants", "Shirt", "Apple", "Banana", "Pots", "Towels", "Ford", "Chevy", "Hammer",
    "Wrench",
];

const FACTORY_DESCRIPTIONS: &[&str] = &[
    "Everyday essential",
    "Limited run from the spring line",
    "Imported, sold individually",
    "Store brand",
    "Returned item, inspected and restocked",
];

/// Demo catalog loaded by `seed_catalog`: name, description, price, available, category.
const DEMO_CATALOG: &[(&str, &str, &str, bool, Category)] = &[
    ("Fedora", "A red hat", "12.50", true, Category::Cloths),
    ("Denim Jacket", "Stonewashed, unisex", "59.99", true, Category::Cloths),
    ("Sourdough Loaf", "Baked daily", "6.25", true, Category::Food),
    ("Espresso Beans", "1kg bag, dark roast", "24.00", false, Category::Food),
    ("Cast Iron Skillet", "Pre-seasoned 12 inch pan", "39.90", true, Category::Housewares),
    ("Bath Towels", "Set of four", "29.00", true, Category::Housewares),
    ("Wiper Blades", "Pair, 22 inch", "18.75", true, Category::Automotive),
    ("Claw Hammer", "16oz steel head", "14.99", false, Category::Tools),
    ("Socket Wrench Set", "40 pieces, metric and imperial", "49.50", true, Category::Tools),
    ("Mystery Box", "Contents vary", "5.00", true, Category::Unknown),
];

/// Deterministic generator of valid, unsaved products.
pub struct ProductFactory {
    rng: StdRng,
}

impl ProductFactory {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn build(&mut self) -> Product {
        let name = FACTORY_NAMES[self.rng.gen_range(0..FACTORY_NAMES.len())];
        let description =
            FACTORY_DESCRIPTIONS[self.rng.gen_range(0..FACTORY_DESCRIPTIONS.len())];
        let category = Category::ALL[self.rng.gen_range(0..Category::ALL.len())];
        let available = self.rng.gen_bool(0.5);
        // 0.50 ..= 2000.00
        let price = Price::from_cents(self.rng.gen_range(50..=200_000));

        Product::new(name, Some(description.to_string()), price, available, category)
    }

    pub fn build_batch(&mut self, count: usize) -> Vec<Product> {
        (0..count).map(|_| self.build()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
    pub existing: u64,
}

/// Loads the demo catalog into an empty product table; a populated table is left alone.
pub async fn seed_catalog(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
    let repository = SqlProductRepository::new(pool.clone());

    let existing = repository.count(&ProductFilter::All).await?;
    if existing > 0 {
        return Ok(SeedResult { inserted: 0, existing });
    }

    let mut inserted = 0;
    for (name, description, price, available, category) in DEMO_CATALOG {
        let mut product = Product::new(
            *name,
            Some((*description).to_string()),
            price.parse::<Price>()?,
            *available,
            *category,
        );
        repository.create(&mut product).await?;
        inserted += 1;
    }

    Ok(SeedResult { inserted, existing })
}

pub fn demo_catalog_len() -> usize {
    DEMO_CATALOG.len()
}
