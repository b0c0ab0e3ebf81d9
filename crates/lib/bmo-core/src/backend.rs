//! HTTP client for the BMO constants backend.
//!
//! Every request carries the fixed session cookie from [`BackendConfig`]. Any
//! status other than 200 is reported as [`BackendError::Status`] together with
//! the vendor `x-op*` diagnostic headers the backend attached.

use std::error::Error;
use std::fmt;

use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap};
use reqwest::{Response, StatusCode};
use tracing::{debug, warn};

use crate::constants::{ConstantType, NewConstant};
use crate::csv::{CsvRecord, csv_to_records};
use crate::search::SearchQuery;

pub const DEFAULT_BASE_URL: &str = "http://bmo.localhost";
pub const DEFAULT_LOGIN_ID: &str = "qwer1234";
pub const SESSION_COOKIE: &str = "bmo_LOGINID";

const ADD_PATH: &str = "constant/actions/add.php";
const CSV_PATH: &str = "constant/data/csv.php";
const SEARCH_PAGE_LENGTH: &str = "36";
const DIAGNOSTIC_MARKER: &str = "x-op";

/// Connection settings for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub login_id: String,
}

impl BackendConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_id: DEFAULT_LOGIN_ID.to_string(),
        }
    }

    #[must_use]
    pub fn with_login_id(mut self, login_id: impl Into<String>) -> Self {
        self.login_id = login_id.into();
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Diagnostic header name/value pairs returned by the backend.
pub type Diagnostics = Vec<(String, String)>;

#[derive(Debug)]
pub enum BackendError {
    Status {
        status: u16,
        diagnostics: Diagnostics,
    },
    Transport(reqwest::Error),
}

impl BackendError {
    /// Vendor diagnostic headers, empty for transport failures.
    #[must_use]
    pub fn diagnostics(&self) -> &[(String, String)] {
        match self {
            Self::Status { diagnostics, .. } => diagnostics,
            Self::Transport(_) => &[],
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, .. } => write!(f, "backend returned HTTP {status}"),
            Self::Transport(err) => write!(f, "backend request failed: {err}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Status { .. } => None,
            Self::Transport(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReply {
    pub status: u16,
    pub diagnostics: Diagnostics,
}

/// Appends diagnostics to a message as ` name: value` pairs.
#[must_use]
pub fn summarize(message: &str, diagnostics: &[(String, String)]) -> String {
    diagnostics
        .iter()
        .fold(message.to_string(), |mut summary, (name, value)| {
            summary.push_str(&format!(" {name}: {value}"));
            summary
        })
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    #[must_use]
    pub const fn with_http_client(http: reqwest::Client, config: BackendConfig) -> Self {
        Self { http, config }
    }

    #[must_use]
    pub const fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Posts a new constant to the add endpoint.
    ///
    /// # Errors
    /// Returns [`BackendError::Status`] for any non-200 reply and
    /// [`BackendError::Transport`] when the request cannot be completed.
    pub async fn add_constant(&self, constant: &NewConstant) -> Result<BackendReply, BackendError> {
        debug!(title = %constant.title, kind = %constant.kind, "adding constant");
        let response = self
            .http
            .post(self.url(ADD_PATH))
            .header(COOKIE, self.cookie())
            .form(constant)
            .send()
            .await?;
        let response = check_status(response)?;
        Ok(BackendReply {
            status: response.status().as_u16(),
            diagnostics: diagnostics(response.headers()),
        })
    }

    /// Fetches the full constant dump.
    ///
    /// # Errors
    /// Same contract as [`Self::add_constant`].
    pub async fn list_constants(&self) -> Result<Vec<CsvRecord>, BackendError> {
        let csv = self.fetch_csv(&[]).await?;
        Ok(csv_to_records(&csv))
    }

    /// Fetches the constants matching a query, optionally limited to one type.
    ///
    /// # Errors
    /// Same contract as [`Self::add_constant`].
    pub async fn search_constants(
        &self,
        query: &SearchQuery,
        filter_type: Option<ConstantType>,
    ) -> Result<Vec<CsvRecord>, BackendError> {
        debug!(
            query = query.as_str(),
            terms = query.terms().len(),
            filter_type = ?filter_type,
            "searching constants"
        );
        let mut params = vec![
            ("fieldset", "list"),
            ("length", SEARCH_PAGE_LENGTH),
            ("search", query.as_str()),
        ];
        if let Some(kind) = filter_type {
            params.push(("filter_type", kind.as_str()));
        }
        let csv = self.fetch_csv(&params).await?;
        Ok(csv_to_records(&csv))
    }

    async fn fetch_csv(&self, params: &[(&str, &str)]) -> Result<String, BackendError> {
        let mut request = self
            .http
            .get(self.url(CSV_PATH))
            .header(COOKIE, self.cookie())
            .header(CONTENT_TYPE, "text/csv")
            .header(ACCEPT, "text/csv");
        if !params.is_empty() {
            request = request.query(params);
        }
        let response = check_status(request.send().await?)?;
        Ok(response.text().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}", self.config.login_id)
    }
}

fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }
    warn!(%status, url = %response.url(), "backend request rejected");
    Err(BackendError::Status {
        status: status.as_u16(),
        diagnostics: diagnostics(response.headers()),
    })
}

fn diagnostics(headers: &HeaderMap) -> Diagnostics {
    headers
        .iter()
        .filter(|(name, _)| name.as_str().contains(DIAGNOSTIC_MARKER))
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_appends_each_diagnostic() {
        let diagnostics = vec![
            ("x-op-status".to_string(), "failed".to_string()),
            ("x-op-message".to_string(), "duplicate title".to_string()),
        ];
        assert_eq!(
            summarize("Failed to add constant.", &diagnostics),
            "Failed to add constant. x-op-status: failed x-op-message: duplicate title"
        );
        assert_eq!(summarize("Done.", &[]), "Done.");
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = BackendClient::new(BackendConfig::new("http://bmo.test/"));
        assert_eq!(
            client.url(CSV_PATH),
            "http://bmo.test/constant/data/csv.php"
        );
        assert_eq!(client.cookie(), "bmo_LOGINID=qwer1234");
    }
}
