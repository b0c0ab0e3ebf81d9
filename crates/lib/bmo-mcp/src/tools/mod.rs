//! MCP tool modules.
//!
//! Every tool is backed by one BMO backend call. Backend failures come back as
//! successful text results that describe the failure.

pub mod constants;
