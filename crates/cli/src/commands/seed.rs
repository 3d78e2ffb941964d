use catalog_db::{seed_catalog, SeedResult};

use crate::commands::{run_migrated, CommandResult, EXIT_SEED};

pub fn run() -> CommandResult {
    let result = run_migrated("seed", |pool| async move {
        seed_catalog(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_SEED))
    });

    match result {
        Ok(outcome) => CommandResult::success("seed", summary(&outcome)),
        Err(failure) => failure,
    }
}

fn summary(outcome: &SeedResult) -> String {
    if outcome.inserted > 0 {
        format!("loaded {} demo products", outcome.inserted)
    } else {
        format!("product table already holds {} products; nothing seeded", outcome.existing)
    }
}
