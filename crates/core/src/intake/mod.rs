//! Client intake: presence validation for the contact / event record and the
//! postal-code address autofill.

pub mod autofill;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::client::{ClientInfo, PaymentMethod};

pub use autofill::{
    AddressAutofill, AddressFields, AutofillOutcome, LookupError, LookupOutcome, PostalLookup,
};

/// Number of digits in a complete postal code.
pub const POSTAL_CODE_DIGITS: usize = 8;

/// Field name → user-facing message. Empty means the record is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(field, message)| (field.as_str(), message.as_str()))
    }

    fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }
}

/// The raw form as submitted. Dates stay optional until validated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeRecord {
    pub name: String,
    pub surname: String,
    pub whatsapp: String,
    pub email: String,
    pub event_name: String,
    pub postal_code: String,
    pub street: String,
    pub street_number: String,
    pub city: String,
    pub state: String,
    pub assembly_date: Option<NaiveDate>,
    pub event_date: Option<NaiveDate>,
    pub disassembly_date: Option<NaiveDate>,
    pub response_deadline: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
}

impl IntakeRecord {
    pub fn validate(&self) -> ValidationErrors {
        validate(self)
    }

    /// Converts a complete record, returning every failing field otherwise.
    pub fn into_client_info(self) -> Result<ClientInfo, ValidationErrors> {
        let errors = validate(&self);
        let (
            Some(assembly_date),
            Some(event_date),
            Some(disassembly_date),
            Some(response_deadline),
        ) = (self.assembly_date, self.event_date, self.disassembly_date, self.response_deadline)
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ClientInfo {
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            whatsapp: self.whatsapp.trim().to_string(),
            email: self.email.trim().to_string(),
            event_name: self.event_name.trim().to_string(),
            postal_code: normalize_postal_code(&self.postal_code),
            street: self.street.trim().to_string(),
            street_number: self.street_number.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            assembly_date,
            event_date,
            disassembly_date,
            response_deadline,
            payment_method: self.payment_method,
        })
    }

    /// Writes autofilled address fields into the form.
    pub fn apply_address(&mut self, address: &AddressFields) {
        self.street = address.street.clone();
        self.city = address.city.clone();
        self.state = address.state.clone();
    }
}

impl From<&ClientInfo> for IntakeRecord {
    fn from(client: &ClientInfo) -> Self {
        Self {
            name: client.name.clone(),
            surname: client.surname.clone(),
            whatsapp: client.whatsapp.clone(),
            email: client.email.clone(),
            event_name: client.event_name.clone(),
            postal_code: client.postal_code.clone(),
            street: client.street.clone(),
            street_number: client.street_number.clone(),
            city: client.city.clone(),
            state: client.state.clone(),
            assembly_date: Some(client.assembly_date),
            event_date: Some(client.event_date),
            disassembly_date: Some(client.disassembly_date),
            response_deadline: Some(client.response_deadline),
            payment_method: client.payment_method,
        }
    }
}

/// Presence check only; formats are not enforced here.
pub fn validate(record: &IntakeRecord) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    let required_text = [
        ("name", record.name.as_str(), "Nome é obrigatório"),
        ("surname", record.surname.as_str(), "Sobrenome é obrigatório"),
        ("whatsapp", record.whatsapp.as_str(), "WhatsApp é obrigatório"),
        ("email", record.email.as_str(), "Email é obrigatório"),
        ("event_name", record.event_name.as_str(), "Nome do evento é obrigatório"),
        ("postal_code", record.postal_code.as_str(), "CEP é obrigatório"),
    ];
    for (field, value, message) in required_text {
        if value.trim().is_empty() {
            errors.insert(field, message);
        }
    }

    let required_dates = [
        ("assembly_date", record.assembly_date, "Data de montagem é obrigatória"),
        ("event_date", record.event_date, "Data do evento é obrigatória"),
        ("disassembly_date", record.disassembly_date, "Data de desmontagem é obrigatória"),
        ("response_deadline", record.response_deadline, "Prazo para orçamento é obrigatório"),
    ];
    for (field, value, message) in required_dates {
        if value.is_none() {
            errors.insert(field, message);
        }
    }

    errors
}

pub fn validate_client(client: &ClientInfo) -> ValidationErrors {
    validate(&IntakeRecord::from(client))
}

/// Strips everything but ASCII digits.
pub fn normalize_postal_code(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// The normalized code, only once it is complete.
pub fn complete_postal_code(raw: &str) -> Option<String> {
    let digits = normalize_postal_code(raw);
    (digits.len() == POSTAL_CODE_DIGITS).then_some(digits)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{complete_postal_code, normalize_postal_code, validate, IntakeRecord};
    use crate::domain::client::PaymentMethod;

    fn date(day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2026, 8, day)
    }

    fn complete_record() -> IntakeRecord {
        IntakeRecord {
            name: "Bruno".to_string(),
            surname: "Lima".to_string(),
            whatsapp: "(11) 98888-7777".to_string(),
            email: "bruno@example.com".to_string(),
            event_name: "Expo Construção".to_string(),
            postal_code: "01310-100".to_string(),
            street: String::new(),
            street_number: "1578".to_string(),
            city: String::new(),
            state: String::new(),
            assembly_date: date(3),
            event_date: date(5),
            disassembly_date: date(8),
            response_deadline: date(1),
            payment_method: PaymentMethod::CardInstallments,
        }
    }

    #[test]
    fn complete_record_is_valid_even_without_address() {
        assert!(validate(&complete_record()).is_empty());
    }

    #[test]
    fn whitespace_only_fields_fail_presence() {
        let record = IntakeRecord {
            name: "   ".to_string(),
            email: "\t".to_string(),
            ..complete_record()
        };

        let errors = validate(&record);
        assert_eq!(errors.field_names(), vec!["email", "name"]);
        assert_eq!(errors.get("name"), Some("Nome é obrigatório"));
    }

    #[test]
    fn empty_record_reports_every_required_field() {
        let errors = validate(&IntakeRecord::default());

        assert_eq!(errors.len(), 10);
        for field in [
            "name",
            "surname",
            "whatsapp",
            "email",
            "event_name",
            "postal_code",
            "assembly_date",
            "event_date",
            "disassembly_date",
            "response_deadline",
        ] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
        assert!(errors.get("city").is_none());
    }

    #[test]
    fn format_is_not_checked() {
        let record = IntakeRecord {
            email: "not-an-email".to_string(),
            whatsapp: "abc".to_string(),
            ..complete_record()
        };
        assert!(validate(&record).is_empty());
    }

    #[test]
    fn into_client_info_trims_and_normalizes() {
        let client = IntakeRecord { name: "  Bruno ".to_string(), ..complete_record() }
            .into_client_info()
            .expect("valid record");

        assert_eq!(client.name, "Bruno");
        assert_eq!(client.postal_code, "01310100");
        assert_eq!(client.payment_method, PaymentMethod::CardInstallments);
    }

    #[test]
    fn into_client_info_returns_all_errors() {
        let errors = IntakeRecord { event_date: None, surname: String::new(), ..complete_record() }
            .into_client_info()
            .expect_err("incomplete record");

        assert_eq!(errors.field_names(), vec!["event_date", "surname"]);
    }

    #[test]
    fn postal_codes_normalize_to_digits() {
        assert_eq!(normalize_postal_code(" 01310-100 "), "01310100");
        assert_eq!(complete_postal_code("01310-100").as_deref(), Some("01310100"));
        assert_eq!(complete_postal_code("01310-10"), None);
        assert_eq!(complete_postal_code("01310-1000"), None);
    }
}
