pub mod catalog;
pub mod pricing;
pub mod selection;

pub use catalog::{Catalog, CatalogError};
pub use pricing::PricingSummary;
pub use selection::{Selection, ToggleOutcome};
