use crate::documents::DocumentView;

/// Chat message body. WhatsApp markup: `*bold*` headings.
pub fn render_chat_message(view: &DocumentView) -> String {
    let mut lines = vec![format!(
        "*SOLICITAÇÃO DE ORÇAMENTO - {}*",
        view.company_name.to_uppercase()
    )];
    if let Some(quote_id) = &view.quote_id {
        lines.push(format!("Orçamento {quote_id}"));
    }
    lines.push(format!("Emitido em {}", view.issued_on));

    lines.push(String::new());
    lines.push("*DADOS DO CLIENTE*".to_string());
    lines.extend(view.client_lines());

    lines.push(String::new());
    lines.push("*ITENS SELECIONADOS*".to_string());
    lines.extend(view.row_lines().into_iter().map(|line| format!("• {line}")));

    lines.push(String::new());
    lines.push(format!("*TOTAL ESTIMADO: {}*", view.total));

    lines.push(String::new());
    lines.push("*OBSERVAÇÕES*".to_string());
    lines.extend(view.observations.iter().map(|observation| format!("- {observation}")));

    lines.push(String::new());
    lines.push("Aguardo retorno!".to_string());
    lines.join("\n")
}
