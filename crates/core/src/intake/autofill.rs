use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::intake::complete_postal_code;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub street: String,
    pub city: String,
    pub state: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(AddressFields),
    NotFound,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("postal lookup unavailable: {0}")]
    Unavailable(String),
}

/// Transport seam for the postal-code service. `postal_code` is always 8 digits.
#[async_trait]
pub trait PostalLookup: Send + Sync {
    async fn lookup(&self, postal_code: &str) -> Result<LookupOutcome, LookupError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AutofillOutcome {
    /// Not 8 digits yet; no lookup was made.
    Incomplete,
    Applied(AddressFields),
    NotFound,
    Unavailable,
    /// A newer input arrived while this lookup was in flight; its result was dropped.
    Superseded,
}

impl AutofillOutcome {
    /// Informational notice for the form, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::NotFound => Some("CEP não encontrado. Preencha o endereço manualmente."),
            Self::Unavailable => {
                Some("Não foi possível concluir a busca do CEP. Preencha o endereço manualmente.")
            }
            Self::Incomplete | Self::Applied(_) | Self::Superseded => None,
        }
    }
}

/// Address fields bound to one postal-code input.
///
/// Every call to [`AddressAutofill::resolve`] or
/// [`AddressAutofill::set_address`] takes a new generation number;
/// a lookup result is written only while its generation is still the latest,
/// so a slow response for an older input never overwrites a newer one.
pub struct AddressAutofill<L> {
    lookup: L,
    generation: AtomicU64,
    address: RwLock<AddressFields>,
}

impl<L: PostalLookup> AddressAutofill<L> {
    pub fn new(lookup: L) -> Self {
        Self::with_address(lookup, AddressFields::default())
    }

    pub fn with_address(lookup: L, address: AddressFields) -> Self {
        Self { lookup, generation: AtomicU64::new(0), address: RwLock::new(address) }
    }

    pub async fn address(&self) -> AddressFields {
        self.address.read().await.clone()
    }

    /// Manual edits made by the user. Any lookup still in flight is superseded.
    pub async fn set_address(&self, address: AddressFields) {
        let mut current = self.address.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *current = address;
    }

    pub async fn resolve(&self, raw_code: &str) -> AutofillOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(postal_code) = complete_postal_code(raw_code) else {
            return AutofillOutcome::Incomplete;
        };

        let result = self.lookup.lookup(&postal_code).await;
        if !self.is_latest(generation) {
            debug!(
                event_name = "intake.postal_lookup.superseded",
                postal_code = %postal_code,
                generation,
                "discarding stale postal lookup response"
            );
            return AutofillOutcome::Superseded;
        }

        match result {
            Ok(LookupOutcome::Found(found)) => {
                let mut address = self.address.write().await;
                if !self.is_latest(generation) {
                    return AutofillOutcome::Superseded;
                }
                *address = found.clone();
                info!(
                    event_name = "intake.postal_lookup.applied",
                    postal_code = %postal_code,
                    city = %found.city,
                    "address filled from postal code"
                );
                AutofillOutcome::Applied(found)
            }
            Ok(LookupOutcome::NotFound) => {
                info!(
                    event_name = "intake.postal_lookup.not_found",
                    postal_code = %postal_code,
                    "postal code not found; keeping address fields"
                );
                AutofillOutcome::NotFound
            }
            Err(error) => {
                warn!(
                    event_name = "intake.postal_lookup.unavailable",
                    postal_code = %postal_code,
                    error = %error,
                    "postal lookup failed; keeping address fields"
                );
                AutofillOutcome::Unavailable
            }
        }
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}
