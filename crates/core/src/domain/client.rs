use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Pix,
    CardUpfront,
    CardInstallments,
    InvoiceSlip,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::CardUpfront => "card_upfront",
            Self::CardInstallments => "card_installments",
            Self::InvoiceSlip => "invoice_slip",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::CardUpfront => "Cartão à vista",
            Self::CardInstallments => "Cartão parcelado",
            Self::InvoiceSlip => "Boleto",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pix" => Some(Self::Pix),
            "card_upfront" => Some(Self::CardUpfront),
            "card_installments" => Some(Self::CardInstallments),
            "invoice_slip" | "boleto" => Some(Self::InvoiceSlip),
            _ => None,
        }
    }
}

/// Contact and event record attached to a quote.
///
/// Address fields may be blank: they are filled from the postal code lookup
/// and stay empty when the lookup misses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub surname: String,
    pub whatsapp: String,
    pub email: String,
    pub event_name: String,
    pub postal_code: String,
    #[serde(default)]
    pub street: String,
    pub street_number: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub assembly_date: NaiveDate,
    pub event_date: NaiveDate,
    pub disassembly_date: NaiveDate,
    pub response_deadline: NaiveDate,
    pub payment_method: PaymentMethod,
}

impl ClientInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.surname.trim()).trim().to_string()
    }

    /// Single-line address, skipping blank parts.
    pub fn address_line(&self) -> String {
        let street = match (self.street.trim(), self.street_number.trim()) {
            ("", "") => String::new(),
            ("", number) => number.to_string(),
            (street, "") => street.to_string(),
            (street, number) => format!("{street}, {number}"),
        };
        let locality = match (self.city.trim(), self.state.trim()) {
            ("", "") => String::new(),
            (city, "") => city.to_string(),
            ("", state) => state.to_string(),
            (city, state) => format!("{city}/{state}"),
        };

        [street, locality]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" - ")
    }
}

/// Field-level edits merged onto a stored [`ClientInfo`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfoPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub event_name: Option<String>,
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub assembly_date: Option<NaiveDate>,
    pub event_date: Option<NaiveDate>,
    pub disassembly_date: Option<NaiveDate>,
    pub response_deadline: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
}

impl ClientInfoPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(self, client: &mut ClientInfo) {
        if let Some(name) = self.name {
            client.name = name;
        }
        if let Some(surname) = self.surname {
            client.surname = surname;
        }
        if let Some(whatsapp) = self.whatsapp {
            client.whatsapp = whatsapp;
        }
        if let Some(email) = self.email {
            client.email = email;
        }
        if let Some(event_name) = self.event_name {
            client.event_name = event_name;
        }
        if let Some(postal_code) = self.postal_code {
            client.postal_code = postal_code;
        }
        if let Some(street) = self.street {
            client.street = street;
        }
        if let Some(street_number) = self.street_number {
            client.street_number = street_number;
        }
        if let Some(city) = self.city {
            client.city = city;
        }
        if let Some(state) = self.state {
            client.state = state;
        }
        if let Some(assembly_date) = self.assembly_date {
            client.assembly_date = assembly_date;
        }
        if let Some(event_date) = self.event_date {
            client.event_date = event_date;
        }
        if let Some(disassembly_date) = self.disassembly_date {
            client.disassembly_date = disassembly_date;
        }
        if let Some(response_deadline) = self.response_deadline {
            client.response_deadline = response_deadline;
        }
        if let Some(payment_method) = self.payment_method {
            client.payment_method = payment_method;
        }
    }
}
