use crate::config::Config;
use crate::error::ApiError;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Skips the tunnel's interstitial page, which would otherwise replace JSON
/// responses with HTML.
pub const TUNNEL_BYPASS_HEADER: &str = "ngrok-skip-browser-warning";

/// Shared HTTP plumbing for every API call: base URL, timeout and the tunnel
/// header are applied once here.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<ApiClient, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(TUNNEL_BYPASS_HEADER, HeaderValue::from_static("true"));
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(ApiClient {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Resolves `path` against the base URL and appends `segments`
    /// percent-encoded, so a plate can never escape its path segment.
    pub fn url(&self, path: &str, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Config(format!("{}: {}", path, e)))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| ApiError::Config(format!("{} cannot take segments", path)))?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    pub async fn get(&self, url: Url) -> Result<Response, ApiError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        Ok(response)
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Response, ApiError> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        Ok(response)
    }

    /// GET and decode a JSON body, turning non-2xx into `ApiError::Status`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.get(url).await?;
        decode_json(ensure_success(response).await?).await
    }
}

pub async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    warn!("{} answered {}: {}", url, status, body);
    Err(ApiError::Status { status, body })
}

pub async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await.map_err(ApiError::from_reqwest)?;
    debug!("Received {} bytes", body.len());
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Message bodies come back either as a JSON string or as plain text.
pub fn unquote_message(body: &str) -> String {
    match serde_json::from_str::<String>(body) {
        Ok(message) => message,
        Err(_) => body.to_string(),
    }
}
