use crate::commands::{run_migrated, CommandResult};

pub fn run() -> CommandResult {
    match run_migrated("migrate", |_pool| async { Ok(()) }) {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(failure) => failure,
    }
}
