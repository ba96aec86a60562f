//! The quote lifecycle store: the one owner of the quote collection.
//!
//! Callers receive quotes by value. Staff mutations need a [`StaffAccess`]
//! token; client submissions go through [`QuoteStore::create`] directly.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cpq::pricing;
use crate::domain::client::{ClientInfo, ClientInfoPatch};
use crate::domain::quote::{Quote, QuoteId, QuoteStage, QuoteStatus, SelectedItem};
use crate::errors::{DomainError, InvalidQuoteReason};
use crate::intake::validate_client;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Proof that the caller passed the external session check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaffAccess {
    _private: (),
}

impl StaffAccess {
    pub fn from_flag(authorized: bool) -> Result<Self, DomainError> {
        if authorized {
            Ok(Self { _private: () })
        } else {
            Err(DomainError::Unauthorized)
        }
    }
}

/// A client submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuote {
    pub client: ClientInfo,
    pub items: Vec<SelectedItem>,
    #[serde(default)]
    pub status: QuoteStatus,
    #[serde(default)]
    pub stage: QuoteStage,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl NewQuote {
    pub fn new(client: ClientInfo, items: Vec<SelectedItem>) -> Self {
        Self {
            client,
            items,
            status: QuoteStatus::default(),
            stage: QuoteStage::default(),
            notes: Vec::new(),
        }
    }
}

/// Field-by-field edits. Absent fields are left as stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotePatch {
    pub status: Option<QuoteStatus>,
    pub stage: Option<QuoteStage>,
    pub items: Option<Vec<SelectedItem>>,
    pub client: ClientInfoPatch,
    pub append_notes: Vec<String>,
}

impl QuotePatch {
    pub fn status(status: QuoteStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn stage(stage: QuoteStage) -> Self {
        Self { stage: Some(stage), ..Self::default() }
    }

    pub fn items(items: Vec<SelectedItem>) -> Self {
        Self { items: Some(items), ..Self::default() }
    }

    pub fn note(note: impl Into<String>) -> Self {
        Self { append_notes: vec![note.into()], ..Self::default() }
    }
}

/// Staff list view: free-text search plus an optional status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteFilter {
    pub search: Option<String>,
    pub status: Option<QuoteStatus>,
}

impl QuoteFilter {
    /// Case-insensitive match on client full name, event name or quote id.
    pub fn matches(&self, quote: &Quote) -> bool {
        if self.status.is_some_and(|status| status != quote.status) {
            return false;
        }

        let Some(term) = self.search.as_deref().map(str::trim).filter(|term| !term.is_empty())
        else {
            return true;
        };
        let term = term.to_lowercase();
        [quote.client.full_name(), quote.client.event_name.clone(), quote.id.0.clone()]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

pub struct QuoteStore<C = SystemClock> {
    quotes: Vec<Quote>,
    next_sequence: u64,
    clock: C,
}

impl QuoteStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for QuoteStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> QuoteStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { quotes: Vec::new(), next_sequence: 1, clock }
    }

    /// Rebuilds a store from an exported snapshot.
    ///
    /// Items must pass the same checks as `create`. Totals are re-derived from
    /// items; new ids continue after the highest restored sequence.
    pub fn restore(quotes: Vec<Quote>, clock: C) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        let mut next_sequence = 1;
        let mut restored = Vec::with_capacity(quotes.len());

        for mut quote in quotes {
            if !seen.insert(quote.id.clone()) {
                return Err(DomainError::InvariantViolation(format!(
                    "quote id `{}` appears more than once",
                    quote.id
                )));
            }
            if quote.updated_at < quote.created_at {
                return Err(DomainError::InvariantViolation(format!(
                    "quote `{}` was updated before it was created",
                    quote.id
                )));
            }
            if let Err(error) = check_items(&quote.items) {
                return Err(DomainError::InvariantViolation(format!(
                    "quote `{}` cannot be restored: {error}",
                    quote.id
                )));
            }
            if !quote.has_consistent_total() {
                warn!(
                    event_name = "quote.restore.total_recomputed",
                    quote_id = %quote.id,
                    stored_total = %quote.total,
                    "stored total disagreed with items; recomputing"
                );
                quote.recompute_total();
            }
            if let Some(sequence) = quote.id.sequence() {
                next_sequence = next_sequence.max(sequence.saturating_add(1));
            }
            restored.push(quote);
        }

        Ok(Self { quotes: restored, next_sequence, clock })
    }

    pub fn create(&mut self, submission: NewQuote) -> Result<QuoteId, DomainError> {
        check_items(&submission.items)?;
        check_client(&submission.client)?;

        let id = QuoteId::from_sequence(self.next_sequence);
        self.next_sequence += 1;
        let now = self.clock.now();

        let mut quote = Quote {
            id: id.clone(),
            client: submission.client,
            items: submission.items,
            total: Default::default(),
            status: submission.status,
            stage: submission.stage,
            created_at: now,
            updated_at: now,
            notes: clean_notes(submission.notes),
        };
        quote.recompute_total();

        info!(
            event_name = "quote.created",
            quote_id = %id,
            items = quote.items.len(),
            total = %quote.total,
            "quote created"
        );
        self.quotes.push(quote);
        Ok(id)
    }

    /// Merges `patch` onto the stored quote. Nothing changes when it fails.
    pub fn update(
        &mut self,
        _access: &StaffAccess,
        id: &QuoteId,
        patch: QuotePatch,
    ) -> Result<(), DomainError> {
        let now = self.clock.now();
        let quote = self
            .quotes
            .iter_mut()
            .find(|quote| &quote.id == id)
            .ok_or_else(|| DomainError::NotFound { quote_id: id.clone() })?;

        let mut updated = quote.clone();
        if let Some(items) = patch.items {
            check_items(&items)?;
            updated.items = items;
            updated.recompute_total();
        }
        if !patch.client.is_empty() {
            patch.client.apply_to(&mut updated.client);
            check_client(&updated.client)?;
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        if let Some(stage) = patch.stage {
            updated.stage = stage;
        }
        updated.notes.extend(clean_notes(patch.append_notes));
        updated.updated_at = advance(quote.updated_at, now);

        info!(
            event_name = "quote.updated",
            quote_id = %id,
            status = updated.status.as_str(),
            stage = updated.stage.as_str(),
            total = %updated.total,
            "quote updated"
        );
        *quote = updated;
        Ok(())
    }

    pub fn get(&self, id: &QuoteId) -> Option<Quote> {
        self.quotes.iter().find(|quote| &quote.id == id).cloned()
    }

    /// Idempotent. Returns whether a quote was removed.
    pub fn delete(&mut self, _access: &StaffAccess, id: &QuoteId) -> bool {
        let before = self.quotes.len();
        self.quotes.retain(|quote| &quote.id != id);
        let removed = self.quotes.len() != before;
        if removed {
            info!(event_name = "quote.deleted", quote_id = %id, "quote deleted");
        }
        removed
    }

    /// Every quote, in creation order.
    pub fn list(&self) -> Vec<Quote> {
        self.quotes.clone()
    }

    pub fn snapshot(&self) -> Vec<Quote> {
        self.list()
    }

    pub fn search(&self, filter: &QuoteFilter) -> Vec<Quote> {
        self.quotes.iter().filter(|quote| filter.matches(quote)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

fn check_items(items: &[SelectedItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::InvalidQuote(InvalidQuoteReason::EmptySelection));
    }

    let mut seen = HashSet::new();
    for selected in items {
        if selected.quantity == 0 {
            return Err(DomainError::InvalidQuote(InvalidQuoteReason::ZeroQuantity {
                item_id: selected.id().clone(),
            }));
        }
        if let Err(reason) =
            pricing::check_unit_amounts(selected.item.unit_price, selected.item.unit_cost)
        {
            return Err(DomainError::InvalidQuote(InvalidQuoteReason::InvalidPrice {
                item_id: selected.id().clone(),
                reason: reason.to_string(),
            }));
        }
        if !seen.insert(selected.id()) {
            return Err(DomainError::InvalidQuote(InvalidQuoteReason::DuplicateItem {
                item_id: selected.id().clone(),
            }));
        }
    }
    Ok(())
}

fn check_client(client: &ClientInfo) -> Result<(), DomainError> {
    let errors = validate_client(client);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::InvalidQuote(InvalidQuoteReason::Validation(errors)))
    }
}

fn clean_notes(notes: Vec<String>) -> Vec<String> {
    notes
        .into_iter()
        .map(|note| note.trim().to_string())
        .filter(|note| !note.is_empty())
        .collect()
}

/// `updated_at` must move forward even when the clock has not.
fn advance(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous + Duration::microseconds(1))
}
