//! Core types and services for bmo-assistant.
//!
//! This crate owns the constant domain model, the naive CSV conversion used on
//! backend dumps, search-query parsing, and the HTTP client that talks to the
//! BMO constants backend.

pub mod backend;
pub mod constants;
pub mod csv;
pub mod observability;
pub mod search;

pub use backend::{BackendClient, BackendConfig, BackendError, BackendReply};
pub use constants::{ConstantType, InvalidConstant, NewConstant};
pub use csv::{CsvRecord, csv_to_records};
pub use search::{MatchMode, SearchQuery, SearchQueryError, SearchTerm};
