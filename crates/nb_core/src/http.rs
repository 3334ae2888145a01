use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://news-briefings-app.onrender.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// JSON-over-HTTP client for the briefing backend.
///
/// Every endpoint is a `POST` with a JSON body; failures come back as
/// `{"error": "..."}` with a non-2xx status.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST `body` to `path` (relative to the base URL) and decode the reply.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(Error::Api { status: status.as_u16(), message });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://localhost:5001/backend", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5001/backend/");
        let joined = client.base_url().join("api/news").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:5001/backend/api/news");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = ApiClient::new("not a url", DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
