use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::ValueEnum;
use expoquote_core::config::LoadOptions;
use expoquote_core::{
    render_chat_message, render_email_body, render_printable, ApplicationError, DocumentView,
    DomainError, EmailMessage, QuoteId,
};
use reqwest::Url;
use tracing::info;

use crate::commands::{
    load_config, load_store, CommandResult, EXIT_BAD_REQUEST, EXIT_CONFIG, EXIT_INTERNAL,
};

const COMMAND: &str = "export";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Channel {
    /// Structured printable document as JSON.
    Printable,
    /// Printable document rendered to HTML.
    Html,
    /// Chat message text.
    Chat,
    /// Email subject and body.
    Email,
}

#[derive(Clone, Debug)]
pub struct ExportArgs {
    pub input: PathBuf,
    pub id: String,
    pub channel: Channel,
    pub link: bool,
    pub issued_on: Option<NaiveDate>,
}

pub fn run(options: &LoadOptions, args: ExportArgs) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure(COMMAND, &error),
    };
    let store = match load_store(&args.input) {
        Ok(store) => store,
        Err(error) => return CommandResult::from_error(COMMAND, error),
    };

    let quote_id = QuoteId(args.id.trim().to_string());
    let Some(quote) = store.get(&quote_id) else {
        return CommandResult::from_error(
            COMMAND,
            ApplicationError::Domain(DomainError::NotFound { quote_id }),
        );
    };

    let issued_on = args.issued_on.unwrap_or_else(|| Utc::now().date_naive());
    let view = DocumentView::for_quote(&quote, issued_on, &config.documents);
    info!(
        event_name = "cli.export.rendered",
        quote_id = %quote.id,
        channel = ?args.channel,
        "quote document rendered"
    );

    match args.channel {
        Channel::Printable => CommandResult::json(COMMAND, &render_printable(&view)),
        Channel::Html => match render_printable(&view).to_html() {
            Ok(html) => CommandResult::text(html),
            Err(error) => {
                CommandResult::failure(COMMAND, "internal", error.to_string(), EXIT_INTERNAL)
            }
        },
        Channel::Chat => {
            let message = render_chat_message(&view);
            if !args.link {
                return CommandResult::text(message);
            }
            let Some(number) = config.documents.sales_whatsapp.as_deref() else {
                return missing_contact("documents.sales_whatsapp");
            };
            link_result(whatsapp_link(number, &message))
        }
        Channel::Email => {
            let message = render_email_body(&view);
            if !args.link {
                return CommandResult::text(format!("Assunto: {}\n\n{}", message.subject, message.body));
            }
            let Some(address) = config.documents.sales_email.as_deref() else {
                return missing_contact("documents.sales_email");
            };
            link_result(mailto_link(address, &message))
        }
    }
}

/// `https://wa.me/{digits}?text=...` with the message percent-encoded.
pub fn whatsapp_link(number: &str, message: &str) -> Result<String, String> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    let mut url =
        Url::parse(&format!("https://wa.me/{digits}")).map_err(|error| error.to_string())?;
    url.query_pairs_mut().append_pair("text", message);
    Ok(with_percent_spaces(url))
}

/// `mailto:{address}?subject=...&body=...`.
pub fn mailto_link(address: &str, message: &EmailMessage) -> Result<String, String> {
    let mut url =
        Url::parse(&format!("mailto:{}", address.trim())).map_err(|error| error.to_string())?;
    url.query_pairs_mut()
        .append_pair("subject", &message.subject)
        .append_pair("body", &message.body);
    Ok(with_percent_spaces(url))
}

// Form encoding writes spaces as `+`, which mail and chat clients show literally.
// A literal `+` is already `%2B` at this point.
fn with_percent_spaces(mut url: Url) -> String {
    let query = url.query().map(|query| query.replace('+', "%20"));
    url.set_query(query.as_deref());
    url.into()
}

fn link_result(link: Result<String, String>) -> CommandResult {
    match link {
        Ok(link) => CommandResult::text(link),
        Err(error) => CommandResult::failure(COMMAND, "bad_request", error, EXIT_BAD_REQUEST),
    }
}

fn missing_contact(key: &str) -> CommandResult {
    CommandResult::failure(
        COMMAND,
        "config_validation",
        format!("`{key}` must be configured to build a link"),
        EXIT_CONFIG,
    )
}
