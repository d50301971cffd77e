//! Input/output helpers.
//!
//! - sheet text parsing (`ingest`)
//! - comparison exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
