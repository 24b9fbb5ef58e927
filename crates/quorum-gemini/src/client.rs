use std::time::Duration;

use reqwest::{
    Client as HttpClient,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};

use crate::{
    api_v1beta::{GenerateContentRequest, GenerateContentResponse},
    error::GeminiError,
};

pub(crate) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-goog-api-key");

/// HTTP client for `models/{model}:generateContent`.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    http: HttpClient,
    base: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GeminiError> {
        let http = HttpClient::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;
        Ok(Self::with_http(api_key, http, base_url))
    }

    pub fn with_http(api_key: impl Into<String>, http: HttpClient, base_url: Option<String>) -> Self {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Self {
            api_key: api_key.into(),
            http,
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(&self.api_key)?);

        let url = format!("{}/models/{}:generateContent", self.base, model);

        #[cfg(feature = "tracing")]
        tracing::debug!(%model, contents = request.contents.len(), "sending request to Gemini");

        let resp = self
            .http
            .post(url)
            .headers(headers)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();

            #[cfg(feature = "tracing")]
            tracing::warn!(%status, %model, "Gemini request failed");

            return Err(GeminiError::Api { status, body });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
