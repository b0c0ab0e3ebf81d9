use std::borrow::Cow;

use bmo_core::backend::summarize;
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode};

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

pub fn invalid_params(err: &impl std::fmt::Display) -> ErrorData {
    mcp_err(ErrorCode::INVALID_PARAMS, err.to_string())
}

/// Text result carrying a message plus the backend's diagnostic headers.
pub fn diagnostic_text(message: &str, diagnostics: &[(String, String)]) -> CallToolResult {
    CallToolResult::success(vec![Content::text(summarize(message, diagnostics))])
}
