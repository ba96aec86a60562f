use serde::Serialize;
use tera::{Context, Tera};

use crate::documents::{
    DocumentError, DocumentField, DocumentRow, DocumentView, EMPTY_ITEMS_LINE,
};
use crate::domain::quote::QuoteId;

const PRINTABLE_TEMPLATE: &str = include_str!("../../templates/printable.html.tera");
const PRINTABLE_TEMPLATE_NAME: &str = "printable.html";

pub const TABLE_COLUMNS: [&str; 4] = ["Item", "Qtd", "Valor Unit.", "Total"];

/// Structured printable quote, handed to the external document writer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrintableDocument {
    pub filename: String,
    pub company_name: String,
    pub tagline: String,
    pub title: &'static str,
    pub quote_id: Option<QuoteId>,
    pub issued_on: String,
    pub client_heading: &'static str,
    pub client_fields: Vec<DocumentField>,
    pub items_heading: &'static str,
    pub columns: [&'static str; 4],
    pub rows: Vec<DocumentRow>,
    pub empty_rows_line: &'static str,
    pub total_label: &'static str,
    pub total: String,
    pub observations_heading: &'static str,
    pub observations: Vec<String>,
    pub footer: String,
}

pub fn render_printable(view: &DocumentView) -> PrintableDocument {
    PrintableDocument {
        filename: filename(view),
        company_name: view.company_name.clone(),
        tagline: view.tagline.clone(),
        title: "ORÇAMENTO",
        quote_id: view.quote_id.clone(),
        issued_on: view.issued_on.clone(),
        client_heading: "DADOS DO CLIENTE",
        client_fields: view.client_fields.clone(),
        items_heading: "ITENS SELECIONADOS",
        columns: TABLE_COLUMNS,
        rows: view.rows.clone(),
        empty_rows_line: EMPTY_ITEMS_LINE,
        total_label: "TOTAL ESTIMADO",
        total: view.total.clone(),
        observations_heading: "OBSERVAÇÕES",
        observations: view.observations.clone(),
        footer: view.footer.clone(),
    }
}

impl PrintableDocument {
    /// HTML for print-to-PDF. Client-entered text is escaped.
    pub fn to_html(&self) -> Result<String, DocumentError> {
        let mut tera = Tera::default();
        tera.add_raw_template(PRINTABLE_TEMPLATE_NAME, PRINTABLE_TEMPLATE)
            .map_err(|error| DocumentError::Template(error.to_string()))?;
        let context = Context::from_serialize(self)
            .map_err(|error| DocumentError::Template(error.to_string()))?;
        tera.render(PRINTABLE_TEMPLATE_NAME, &context)
            .map_err(|error| DocumentError::Template(error.to_string()))
    }
}

/// `Orcamento_{given name}_{YYYY-MM-DD}.pdf`, whitespace runs as `_`.
fn filename(view: &DocumentView) -> String {
    let name = view.given_name.split_whitespace().collect::<Vec<_>>().join("_");
    let name = if name.is_empty() { "Cliente".to_string() } else { name };
    format!("Orcamento_{}_{}.pdf", name, view.file_date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::render_printable;
    use crate::documents::fixtures::{client, date, items, quote};
    use crate::documents::{DocumentSettings, DocumentView};
    use rust_decimal::Decimal;

    #[test]
    fn filename_uses_given_name_and_creation_date() {
        let view = DocumentView::for_quote(&quote(), date(9, 2), &DocumentSettings::default());
        assert_eq!(render_printable(&view).filename, "Orcamento_Maria_Clara_2026-08-21.pdf");
    }

    #[test]
    fn ad_hoc_documents_use_the_issue_date() {
        let mut client = client();
        client.name = "  Ana   Luiza ".to_string();
        let view = DocumentView::new(
            &client,
            &items(),
            Decimal::new(20_200, 0),
            date(9, 2),
            &DocumentSettings::default(),
        );
        assert_eq!(render_printable(&view).filename, "Orcamento_Ana_Luiza_2026-09-02.pdf");
    }

    #[test]
    fn sections_are_in_document_order() {
        let view = DocumentView::for_quote(&quote(), date(9, 2), &DocumentSettings::default());
        let document = render_printable(&view);

        assert_eq!(document.title, "ORÇAMENTO");
        assert_eq!(document.columns, ["Item", "Qtd", "Valor Unit.", "Total"]);
        assert_eq!(document.rows.len(), 3);
        assert_eq!(document.rows[0].name, "Ilha");
        assert_eq!(document.observations[1], "Prazo de validade: 30 dias");
        assert_eq!(document.observations[2], "Forma de pagamento: Cartão parcelado");
    }

    #[test]
    fn html_contains_every_section_and_escapes_input() {
        let mut quote = quote();
        quote.client.event_name = "<Expo & Cia>".to_string();
        let view = DocumentView::for_quote(&quote, date(9, 2), &DocumentSettings::default());
        let html = render_printable(&view).to_html().expect("html");

        for expected in [
            "MovePlay Cenografia",
            "ORÇAMENTO",
            "DADOS DO CLIENTE",
            "ITENS SELECIONADOS",
            "R$ 3.400,00",
            "TOTAL ESTIMADO",
            "R$ 20.200,00",
            "MPB-000012",
            "&lt;Expo &amp; Cia&gt;",
        ] {
            assert!(html.contains(expected), "missing {expected}");
        }
        let header = html.find("DADOS DO CLIENTE").expect("client block");
        let table = html.find("ITENS SELECIONADOS").expect("table");
        let total = html.find("TOTAL ESTIMADO").expect("total");
        assert!(header < table && table < total);
    }
}
