//! Document synthesis: one quote rendered as a printable document, a chat
//! message and an e-mail.
//!
//! All three channels read the same [`DocumentView`], so money, dates, the
//! client block and item rows are the same strings everywhere.

pub mod chat;
pub mod email;
pub mod format;
pub mod printable;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::client::ClientInfo;
use crate::domain::quote::{Quote, QuoteId, SelectedItem};

pub use chat::render_chat_message;
pub use email::{render_email_body, EmailMessage};
pub use format::{format_brl, format_date, format_postal_code};
pub use printable::{render_printable, PrintableDocument};

/// Shown in place of item rows when a quote has none.
pub const EMPTY_ITEMS_LINE: &str = "Nenhum item selecionado";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document template failed: {0}")]
    Template(String),
}

/// Company details printed on every channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSettings {
    pub company_name: String,
    pub tagline: String,
    pub validity_days: u32,
    pub sales_whatsapp: Option<String>,
    pub sales_email: Option<String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            company_name: "MovePlay Cenografia".to_string(),
            tagline: "Especializada em Estandes Corporativos".to_string(),
            validity_days: 30,
            sales_whatsapp: None,
            sales_email: None,
        }
    }
}

impl DocumentSettings {
    /// `Company | WhatsApp: ... | Email: ...`, skipping unset contacts.
    pub fn footer(&self) -> String {
        let mut parts = vec![self.company_name.clone()];
        if let Some(whatsapp) = self.sales_whatsapp.as_deref().filter(|value| !value.is_empty()) {
            parts.push(format!("WhatsApp: {whatsapp}"));
        }
        if let Some(email) = self.sales_email.as_deref().filter(|value| !value.is_empty()) {
            parts.push(format!("Email: {email}"));
        }
        parts.join(" | ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentField {
    pub label: &'static str,
    pub value: String,
}

/// One item table row, already formatted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentRow {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl DocumentRow {
    fn from_selected(selected: &SelectedItem) -> Self {
        Self {
            name: selected.item.name.clone(),
            quantity: selected.quantity,
            unit_price: format_brl(selected.item.unit_price),
            line_total: format_brl(selected.line_total()),
        }
    }

    /// The row as a single text line, used verbatim by the text channels.
    pub fn line(&self) -> String {
        format!("{}x {} | {} | {}", self.quantity, self.name, self.unit_price, self.line_total)
    }
}

/// Everything a renderer prints, formatted once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentView {
    pub company_name: String,
    pub tagline: String,
    pub quote_id: Option<QuoteId>,
    pub issued_on: String,
    pub client_name: String,
    pub given_name: String,
    pub event_name: String,
    pub client_fields: Vec<DocumentField>,
    pub rows: Vec<DocumentRow>,
    pub total: String,
    pub observations: Vec<String>,
    pub footer: String,
    #[serde(skip)]
    pub file_date: NaiveDate,
}

impl DocumentView {
    /// Builds the view for an ad-hoc `(client, items, total)` triple.
    pub fn new(
        client: &ClientInfo,
        items: &[SelectedItem],
        total: Decimal,
        issued_on: NaiveDate,
        settings: &DocumentSettings,
    ) -> Self {
        let address = client.address_line();
        let mut client_fields = vec![
            DocumentField { label: "Nome", value: client.full_name() },
            DocumentField { label: "WhatsApp", value: client.whatsapp.trim().to_string() },
            DocumentField { label: "Email", value: client.email.trim().to_string() },
            DocumentField { label: "Evento", value: client.event_name.trim().to_string() },
        ];
        if !address.is_empty() {
            client_fields.push(DocumentField { label: "Local", value: address });
        }
        client_fields.extend([
            DocumentField { label: "CEP", value: format_postal_code(&client.postal_code) },
            DocumentField { label: "Montagem", value: format_date(client.assembly_date) },
            DocumentField { label: "Data do Evento", value: format_date(client.event_date) },
            DocumentField { label: "Desmontagem", value: format_date(client.disassembly_date) },
            DocumentField {
                label: "Prazo para orçamento",
                value: format_date(client.response_deadline),
            },
        ]);

        Self {
            company_name: settings.company_name.clone(),
            tagline: settings.tagline.clone(),
            quote_id: None,
            issued_on: format_date(issued_on),
            client_name: client.full_name(),
            given_name: client.name.trim().to_string(),
            event_name: client.event_name.trim().to_string(),
            client_fields,
            rows: items.iter().map(DocumentRow::from_selected).collect(),
            total: format_brl(total),
            observations: vec![
                "Valores estimados sujeitos a alteração após análise técnica".to_string(),
                format!("Prazo de validade: {} dias", settings.validity_days),
                format!("Forma de pagamento: {}", client.payment_method.label()),
                "Modelo de comodato - equipamentos retornam após o evento".to_string(),
            ],
            footer: settings.footer(),
            file_date: issued_on,
        }
    }

    /// Builds the view for a stored quote; the file date is its creation date.
    pub fn for_quote(quote: &Quote, issued_on: NaiveDate, settings: &DocumentSettings) -> Self {
        let mut view = Self::new(&quote.client, &quote.items, quote.total, issued_on, settings);
        view.quote_id = Some(quote.id.clone());
        view.file_date = quote.created_at.date_naive();
        view
    }

    /// Item lines for the text channels, with a placeholder when empty.
    pub fn row_lines(&self) -> Vec<String> {
        if self.rows.is_empty() {
            return vec![EMPTY_ITEMS_LINE.to_string()];
        }
        self.rows.iter().map(DocumentRow::line).collect()
    }

    pub fn client_lines(&self) -> Vec<String> {
        self.client_fields.iter().map(|field| format!("{}: {}", field.label, field.value)).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{date, quote};
    use super::{
        render_chat_message, render_email_body, render_printable, DocumentSettings, DocumentView,
        EMPTY_ITEMS_LINE,
    };

    fn settings() -> DocumentSettings {
        DocumentSettings {
            sales_whatsapp: Some("(11) 99196-4667".to_string()),
            sales_email: Some("orcamentos@example.com".to_string()),
            ..DocumentSettings::default()
        }
    }

    fn positions(haystack: &str, needles: &[String]) -> Vec<usize> {
        needles
            .iter()
            .map(|needle| haystack.find(needle.as_str()).unwrap_or_else(|| panic!("missing {needle}")))
            .collect()
    }

    #[test]
    fn view_formats_rows_and_total() {
        let quote = quote();
        let view = DocumentView::for_quote(&quote, date(8, 22), &settings());

        assert_eq!(view.total, "R$ 20.200,00");
        assert_eq!(view.rows[1].line(), "4x Spot | R$ 850,00 | R$ 3.400,00");
        assert_eq!(view.given_name, "Maria Clara");
        assert_eq!(view.file_date, date(8, 21));
        assert!(view.client_lines().contains(&"CEP: 01310-100".to_string()));
    }

    #[test]
    fn channels_share_money_dates_and_item_order() {
        let quote = quote();
        let settings = settings();
        let issued = date(8, 22);
        let view = DocumentView::for_quote(&quote, issued, &settings);

        let printable = render_printable(&view);
        let chat = render_chat_message(&view);
        let email = render_email_body(&view);

        let printable_lines: Vec<_> = printable.rows.iter().map(|row| row.line()).collect();
        assert_eq!(printable_lines, view.row_lines());
        assert_eq!(printable.total, view.total);
        assert_eq!(printable.client_fields, view.client_fields);

        for text in [&chat, &email.body] {
            let row_positions = positions(text, &printable_lines);
            assert!(row_positions.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(text.contains(&printable.total));
            for line in view.client_lines() {
                assert!(text.contains(&line), "missing client line {line}");
            }
            for observation in &printable.observations {
                assert!(text.contains(observation.as_str()));
            }
        }
    }

    #[test]
    fn sections_follow_the_same_order_on_text_channels() {
        let quote = quote();
        let settings = settings();
        let view = DocumentView::for_quote(&quote, date(8, 22), &settings);
        let anchors = vec![
            view.client_lines()[0].clone(),
            view.row_lines()[0].clone(),
            view.total.clone(),
            view.observations[0].clone(),
        ];

        let chat = render_chat_message(&view);
        let email = render_email_body(&view).body;

        for text in [chat, email] {
            let found = positions(&text, &anchors);
            assert!(found.windows(2).all(|pair| pair[0] < pair[1]), "out of order: {text}");
        }
    }

    #[test]
    fn empty_items_still_render_everywhere() {
        let mut quote = quote();
        quote.items.clear();
        quote.recompute_total();
        let settings = settings();
        let view = DocumentView::for_quote(&quote, date(8, 22), &settings);

        let printable = render_printable(&view);
        let chat = render_chat_message(&view);
        let email = render_email_body(&view);

        assert!(printable.rows.is_empty());
        assert_eq!(printable.total, "R$ 0,00");
        assert!(printable.to_html().expect("html").contains(EMPTY_ITEMS_LINE));
        assert!(chat.contains(EMPTY_ITEMS_LINE));
        assert!(email.body.contains(EMPTY_ITEMS_LINE));
    }

    #[test]
    fn rendering_leaves_the_quote_untouched() {
        let quote = quote();
        let before = quote.clone();
        let settings = settings();
        let view = DocumentView::for_quote(&quote, date(8, 22), &settings);
        let _ = render_printable(&view);
        let _ = render_chat_message(&view);
        let _ = render_email_body(&view);

        assert_eq!(quote, before);
    }

    #[test]
    fn footer_skips_unset_contacts() {
        assert_eq!(DocumentSettings::default().footer(), "MovePlay Cenografia");
        assert_eq!(
            settings().footer(),
            "MovePlay Cenografia | WhatsApp: (11) 99196-4667 | Email: orcamentos@example.com"
        );
    }

    #[test]
    fn blank_address_is_left_out_of_the_client_block() {
        let mut quote = quote();
        quote.client.street.clear();
        quote.client.street_number.clear();
        quote.client.city.clear();
        quote.client.state.clear();
        let view = DocumentView::for_quote(&quote, date(8, 22), &settings());

        assert!(view.client_fields.iter().all(|field| field.label != "Local"));
    }
}
