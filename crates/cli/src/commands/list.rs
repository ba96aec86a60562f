use std::path::Path;

use expoquote_core::analytics::QuoteCard;
use expoquote_core::{QuoteFilter, QuoteStatus};

use crate::commands::{load_store, CommandResult, EXIT_BAD_REQUEST};

const COMMAND: &str = "list";

pub fn run(input: &Path, search: Option<String>, status: Option<&str>) -> CommandResult {
    let status = match status.map(|raw| QuoteStatus::parse(raw).ok_or(raw)).transpose() {
        Ok(status) => status,
        Err(raw) => {
            return CommandResult::failure(
                COMMAND,
                "bad_request",
                format!("unknown status `{raw}` (expected hot|warm|cold)"),
                EXIT_BAD_REQUEST,
            )
        }
    };

    let store = match load_store(input) {
        Ok(store) => store,
        Err(error) => return CommandResult::from_error(COMMAND, error),
    };

    let cards: Vec<QuoteCard> =
        store.search(&QuoteFilter { search, status }).iter().map(QuoteCard::from).collect();
    CommandResult::json(COMMAND, &cards)
}
