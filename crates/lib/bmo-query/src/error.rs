use std::error::Error;
use std::fmt;

/// Errors surfaced by the query pipeline.
///
/// Variants carry rendered messages so a single outcome can be shared by every
/// caller waiting on the tool host connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    Connect(String),
    ToolHost(String),
    Generation(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(message) => write!(f, "tool host connection failed: {message}"),
            Self::ToolHost(message) => write!(f, "tool host request failed: {message}"),
            Self::Generation(message) => write!(f, "text generation failed: {message}"),
        }
    }
}

impl Error for QueryError {}
