use crate::io::{build_document_reader, SourceMeta};
use futures::TryStreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

const EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d";
const DOC_MARKER: &str = "spreadsheets/d/";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Not a spreadsheet URL (expected '.../spreadsheets/d/<id>/...'): {0}")]
    InvalidUrlFormat(String),
    #[error("Spreadsheet is private or requires sign-in: {url}")]
    Unauthorized { url: String },
    #[error("Download of {url} failed: {reason}")]
    TransferFailed { url: String, reason: String },
    #[error("HTTP client could not be configured: {0}")]
    ClientSetup(#[source] reqwest::Error),
}

/// Rewrite a sharing/edit URL into its CSV export URL.
///
/// The sheet tab comes from `gid=<n>` after `#`, `&` or `?`; tab `0` when absent.
pub fn export_url(url: &str) -> Result<String, FetchError> {
    let id = url
        .find(DOC_MARKER)
        .map(|at| &url[at + DOC_MARKER.len()..])
        .map(|rest| {
            rest.split(['/', '?', '#', '&'])
                .next()
                .unwrap_or_default()
        })
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FetchError::InvalidUrlFormat(url.to_string()))?;

    let gid = ["#gid=", "&gid=", "?gid="]
        .iter()
        .filter_map(|key| url.find(key).map(|at| &url[at + key.len()..]))
        .map(|rest| {
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            &rest[..end]
        })
        .find(|gid| !gid.is_empty())
        .unwrap_or("0");

    Ok(format!("{EXPORT_BASE}/{id}/export?format=csv&gid={gid}"))
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads sheet documents over HTTP.
pub struct SheetFetcher {
    client: reqwest::Client,
}

impl SheetFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientSetup)?;
        Ok(Self { client })
    }

    /// Fetch the CSV export behind a spreadsheet sharing URL.
    pub async fn fetch(&self, spreadsheet_url: &str) -> Result<String, FetchError> {
        let url = export_url(spreadsheet_url)?;
        self.fetch_export(&url).await
    }

    /// Download an already rewritten export URL.
    ///
    /// 401/403 and HTML bodies map to [`FetchError::Unauthorized`]; any other
    /// failure maps to [`FetchError::TransferFailed`].
    pub async fn fetch_export(&self, url: &str) -> Result<String, FetchError> {
        tracing::info!(%url, "downloading sheet");

        let transfer_failed = |reason: String| FetchError::TransferFailed {
            url: url.to_string(),
            reason,
        };
        let unauthorized = || FetchError::Unauthorized {
            url: url.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transfer_failed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(unauthorized());
        }
        if !status.is_success() {
            return Err(transfer_failed(format!("HTTP {status}")));
        }

        let header = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        let meta = SourceMeta {
            content_type: header(reqwest::header::CONTENT_TYPE),
            content_encoding: header(reqwest::header::CONTENT_ENCODING),
            name_hint: url.to_string(),
            ..Default::default()
        };
        // private sheets redirect to an HTML sign-in page instead of failing
        if meta.content_type.to_ascii_lowercase().starts_with("text/html") {
            return Err(unauthorized());
        }

        let body = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
        let mut reader = build_document_reader(StreamReader::new(body), &meta);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| transfer_failed(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| transfer_failed(e.to_string()))?;

        tracing::debug!(%url, bytes = text.len(), "sheet downloaded");
        Ok(text)
    }
}
