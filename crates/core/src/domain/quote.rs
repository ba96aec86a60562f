use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::pricing;
use crate::domain::catalog::{CatalogItem, ItemId};
use crate::domain::client::ClientInfo;

const QUOTE_ID_PREFIX: &str = "MPB-";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub String);

impl QuoteId {
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("{QUOTE_ID_PREFIX}{sequence:06}"))
    }

    /// Sequence number encoded in a store-issued id.
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(QUOTE_ID_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sales temperature, independent of the pipeline stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Hot,
    #[default]
    Warm,
    Cold,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hot" => Some(Self::Hot),
            "warm" => Some(Self::Warm),
            "cold" => Some(Self::Cold),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hot => "Quente",
            Self::Warm => "Morno",
            Self::Cold => "Frio",
        }
    }
}

/// Position in the sales pipeline. Declaration order is pipeline order.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStage {
    #[default]
    Received,
    Contact,
    Proposal,
    Negotiation,
    Closed,
}

impl QuoteStage {
    pub const ALL: [QuoteStage; 5] =
        [Self::Received, Self::Contact, Self::Proposal, Self::Negotiation, Self::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Contact => "contact",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Closed => "closed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Received => "Recebidos",
            Self::Contact => "Em Contato",
            Self::Proposal => "Proposta",
            Self::Negotiation => "Negociação",
            Self::Closed => "Fechados",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "received" => Some(Self::Received),
            "contact" => Some(Self::Contact),
            "proposal" => Some(Self::Proposal),
            "negotiation" => Some(Self::Negotiation),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::ALL.iter().copied().find(|stage| stage > self)
    }
}

/// A catalog item snapshot with the quantity the client picked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub item: CatalogItem,
    pub quantity: u32,
}

impl SelectedItem {
    pub fn new(item: CatalogItem, quantity: u32) -> Self {
        Self { item, quantity: quantity.max(1) }
    }

    pub fn id(&self) -> &ItemId {
        &self.item.id
    }

    pub fn line_total(&self) -> Decimal {
        pricing::line_total(&self.item.unit_price, self.quantity)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub client: ClientInfo,
    pub items: Vec<SelectedItem>,
    pub total: Decimal,
    pub status: QuoteStatus,
    pub stage: QuoteStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Quote {
    /// Re-derives `total` from `items`. Called by the store on every item change.
    pub fn recompute_total(&mut self) {
        self.total = pricing::items_total(&self.items);
    }

    pub fn has_consistent_total(&self) -> bool {
        self.total == pricing::items_total(&self.items)
    }
}
