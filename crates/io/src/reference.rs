use std::path::PathBuf;
use std::time::Duration;

use readactor_recon::ReferenceTable;
use tracing::{debug, info};

use crate::csv::{parse_table, read_candidates};
use crate::error::IoError;

/// Location of the authoritative person table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    Url(String),
    Path(PathBuf),
}

impl ReferenceSource {
    /// `http://` and `https://` are URLs, anything else is a local path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::Path(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn load_reference(source: &ReferenceSource, timeout: Duration) -> Result<ReferenceTable, IoError> {
    info!("Loading reference table from {source}");
    let table = match source {
        ReferenceSource::Path(path) => read_candidates(path)?,
        ReferenceSource::Url(url) => {
            let body = fetch_text(url, timeout)?;
            parse_table(&body, url)?
        }
    };
    debug!(rows = table.len(), columns = table.columns.len(), "reference table loaded");
    Ok(table.into_reference())
}

fn fetch_text(url: &str, timeout: Duration) -> Result<String, IoError> {
    let fetch_err = |message: String| IoError::Fetch {
        url: url.to_string(),
        message,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("readactor/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| fetch_err(e.to_string()))?;

    let resp = client.get(url).send().map_err(|e| {
        if e.is_timeout() {
            fetch_err("request timed out".into())
        } else if e.is_connect() {
            fetch_err("connection failed".into())
        } else {
            fetch_err(e.to_string())
        }
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(fetch_err(format!("HTTP {}", status.as_u16())));
    }
    resp.text().map_err(|e| fetch_err(e.to_string()))
}
