//! Sheet data access.
//!
//! - fixed source location and ingestion knobs (`source`)
//! - transport candidates and the first-success fallback (`transport`)
//! - the fetch → validate → parse → index pipeline (`sheets`)

pub mod sheets;
pub mod source;
pub mod transport;

pub use sheets::{FetchOutcome, SheetSource};
pub use source::SourceConfig;
pub use transport::{HttpTransport, Transport};
