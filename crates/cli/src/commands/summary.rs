use std::path::Path;

use expoquote_core::analytics::summarize;

use crate::commands::{load_store, CommandResult};

const COMMAND: &str = "summary";

pub fn run(input: &Path, top_n: usize) -> CommandResult {
    let store = match load_store(input) {
        Ok(store) => store,
        Err(error) => return CommandResult::from_error(COMMAND, error),
    };

    let quotes = store.snapshot();
    CommandResult::json(COMMAND, &summarize(&quotes, top_n))
}
