//! Multi-field filtering and offset pagination shared by every catalog kind.
//!
//! Everything here is synchronous and allocation-light; callers run it on
//! snapshots already fetched by the catalog client.

pub mod field;
pub mod filter;
pub mod page;
pub mod record;
pub mod spec;

use thiserror::Error;

pub use field::{classify, FieldKind, FieldValue, Filterable};
pub use filter::{apply, unique_values};
pub use page::{paginate, Page};
pub use spec::{FilterSpec, Predicate};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid selection for {field}: {reason}")]
    InvalidSelection { field: String, reason: String },
}
