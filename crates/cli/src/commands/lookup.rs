use expoquote_core::config::LoadOptions;
use expoquote_core::documents::format_postal_code;
use expoquote_core::intake::{normalize_postal_code, AddressFields};
use expoquote_core::{AddressAutofill, ApplicationError, AutofillOutcome};
use serde::Serialize;

use crate::commands::{load_config, CommandResult, EXIT_BAD_REQUEST, EXIT_INTERNAL};
use crate::viacep::ViaCepLookup;

const COMMAND: &str = "lookup";

#[derive(Debug, Serialize)]
struct LookupReport {
    postal_code: String,
    outcome: &'static str,
    address: AddressFields,
    notice: Option<&'static str>,
}

pub fn run(options: &LoadOptions, raw_code: &str) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure(COMMAND, &error),
    };
    let lookup = match ViaCepLookup::new(&config.postal) {
        Ok(lookup) => lookup,
        Err(error) => {
            return CommandResult::from_error(
                COMMAND,
                ApplicationError::Integration(error.to_string()),
            )
        }
    };
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "internal",
                format!("failed to initialize async runtime: {error}"),
                EXIT_INTERNAL,
            )
        }
    };

    let autofill = AddressAutofill::new(lookup);
    let (outcome, address) = runtime.block_on(async {
        let outcome = autofill.resolve(raw_code).await;
        (outcome, autofill.address().await)
    });

    if outcome == AutofillOutcome::Incomplete {
        return CommandResult::failure(
            COMMAND,
            "bad_request",
            format!("postal code `{}` does not have 8 digits", raw_code.trim()),
            EXIT_BAD_REQUEST,
        );
    }

    let report = LookupReport {
        postal_code: format_postal_code(&normalize_postal_code(raw_code)),
        outcome: outcome_name(&outcome),
        address,
        notice: outcome.notice(),
    };
    CommandResult::json(COMMAND, &report)
}

fn outcome_name(outcome: &AutofillOutcome) -> &'static str {
    match outcome {
        AutofillOutcome::Incomplete => "incomplete",
        AutofillOutcome::Applied(_) => "applied",
        AutofillOutcome::NotFound => "not_found",
        AutofillOutcome::Unavailable => "unavailable",
        AutofillOutcome::Superseded => "superseded",
    }
}
