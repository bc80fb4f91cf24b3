#[cfg(feature = "network")]
use std::time::Duration;

use thiserror::Error;

#[cfg(feature = "network")]
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[cfg(feature = "network")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("built without network support")]
    Disabled,
}

/// Something that can turn a URL into the text behind it.
pub trait TextSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpSource;

impl TextSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_url(url)
    }
}

/// Serves the same text for every URL. Used for preloaded and test lexicons.
pub struct StaticSource {
    text: String,
}

impl StaticSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextSource for StaticSource {
    fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        Ok(self.text.clone())
    }
}

#[cfg(feature = "network")]
pub fn fetch_url(url: &str) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(response.text()?)
}

#[cfg(not(feature = "network"))]
pub fn fetch_url(_url: &str) -> Result<String, FetchError> {
    Err(FetchError::Disabled)
}
