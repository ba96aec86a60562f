pub mod analytics;
pub mod config;
pub mod cpq;
pub mod documents;
pub mod domain;
pub mod errors;
pub mod intake;
pub mod store;

pub use analytics::{AnalyticsSummary, MonthBucket, PipelineBoard};
pub use cpq::{Catalog, CatalogError, PricingSummary, Selection, ToggleOutcome};
pub use documents::{
    render_chat_message, render_email_body, render_printable, DocumentSettings, DocumentView,
    EmailMessage, PrintableDocument,
};
pub use domain::catalog::{CatalogItem, Category, CategoryId, ItemId};
pub use domain::client::{ClientInfo, ClientInfoPatch, PaymentMethod};
pub use domain::quote::{Quote, QuoteId, QuoteStage, QuoteStatus, SelectedItem};
pub use errors::{ApplicationError, DomainError, InterfaceError, InvalidQuoteReason};
pub use intake::{AddressAutofill, AutofillOutcome, IntakeRecord, PostalLookup, ValidationErrors};
pub use store::{NewQuote, QuoteFilter, QuotePatch, QuoteStore, StaffAccess};
