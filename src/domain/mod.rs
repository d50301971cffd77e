//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - platform and delimiter enums (`Platform`, `DelimiterFormat`)
//! - the validated sheet row (`Record`)
//! - date-label ordering against the reference year
//! - weekly comparison outputs (`ComparisonResult`, `Trend`)

pub mod types;

pub use types::*;
