use serde::Serialize;

use crate::documents::DocumentView;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

pub fn render_email_body(view: &DocumentView) -> EmailMessage {
    let subject = match view.event_name.as_str() {
        "" => "Orçamento".to_string(),
        event => format!("Orçamento - {event}"),
    };

    let mut lines = vec![
        "Prezados,".to_string(),
        String::new(),
        "Gostaria de solicitar um orçamento para cenografia de estande corporativo.".to_string(),
    ];
    if let Some(quote_id) = &view.quote_id {
        lines.push(format!("Referência: {quote_id} (emitido em {})", view.issued_on));
    } else {
        lines.push(format!("Emitido em {}", view.issued_on));
    }

    lines.push(String::new());
    lines.push("DADOS DO CLIENTE".to_string());
    lines.extend(view.client_lines());

    lines.push(String::new());
    lines.push("ITENS SELECIONADOS".to_string());
    lines.extend(view.row_lines().into_iter().map(|line| format!("- {line}")));

    lines.push(String::new());
    lines.push(format!("TOTAL ESTIMADO: {}", view.total));

    lines.push(String::new());
    lines.push("OBSERVAÇÕES".to_string());
    lines.extend(view.observations.iter().map(|observation| format!("- {observation}")));

    lines.push(String::new());
    lines.push("Aguardo retorno.".to_string());
    lines.push(String::new());
    lines.push("Atenciosamente,".to_string());
    lines.push(view.client_name.clone());

    EmailMessage { subject, body: lines.join("\n") }
}
