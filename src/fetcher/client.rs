use crate::config::{Config, RequestProfile};
use crate::fetcher::{
    errors::FetchError,
    pipeline::process_search_response,
    types::{ImagePayload, SearchPage},
};
use async_trait::async_trait;
use reqwest::{
    Client, ClientBuilder, Response,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Network boundary of the pipeline.
///
/// Each call makes exactly one request. Failures come back as a
/// [`FetchError`]; nothing is retried.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the image search results page for `keyword`.
    async fn search(&self, keyword: &str) -> Result<SearchPage, FetchError>;

    /// Download one candidate image.
    async fn fetch_image(&self, url: &str) -> Result<ImagePayload, FetchError>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    search_url: Url,
    language: String,
    region: String,
    search_timeout: Duration,
    image_timeout: Duration,
    max_image_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let profile = config.profile();
        let client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout())
            .user_agent(profile.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(default_headers(profile)?)
            .build()
            .map_err(|e| FetchError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            search_url: Url::parse(config.search_url())?,
            language: profile.language.clone(),
            region: profile.region.clone(),
            search_timeout: config.search_timeout(),
            image_timeout: config.image_timeout(),
            max_image_bytes: config.max_image_bytes(),
        })
    }

    /// Search URL for `keyword`, with the image-search and locale parameters.
    pub fn search_url_for(&self, keyword: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", keyword)
            .append_pair("tbm", "isch")
            .append_pair("hl", &self.language)
            .append_pair("gl", &self.region);
        url
    }

    async fn get(&self, url: Url, timeout: Duration) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status });
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn search(&self, keyword: &str) -> Result<SearchPage, FetchError> {
        let url = self.search_url_for(keyword);
        let response = self.get(url, self.search_timeout).await?;

        let final_url = response.url().clone();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        let body_bytes = response
            .bytes()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        debug!(size = body_bytes.len(), %content_type, "search page received");
        Ok(process_search_response(
            final_url,
            status,
            body_bytes,
            &content_type,
        ))
    }

    #[instrument(skip(self))]
    async fn fetch_image(&self, url: &str) -> Result<ImagePayload, FetchError> {
        let parsed_url = Url::parse(url)?;
        let response = self.get(parsed_url, self.image_timeout).await?;

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > self.max_image_bytes
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let url_final = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Content-Length may be missing or wrong
        if body.len() as u64 > self.max_image_bytes {
            return Err(FetchError::BodyTooLarge(body.len() as u64));
        }

        Ok(ImagePayload {
            url_final,
            content_type,
            body,
        })
    }
}

fn default_headers(profile: &RequestProfile) -> Result<HeaderMap, FetchError> {
    let pairs = [
        (header::ACCEPT, &profile.accept),
        (header::ACCEPT_LANGUAGE, &profile.accept_language),
        (header::ACCEPT_ENCODING, &profile.accept_encoding),
        (header::CONNECTION, &profile.connection),
        (
            header::UPGRADE_INSECURE_REQUESTS,
            &profile.upgrade_insecure_requests,
        ),
        (header::CACHE_CONTROL, &profile.cache_control),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let value = header_value(&name, value)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value)
        .map_err(|e| FetchError::Setup(format!("invalid value for header {name}: {e}")))
}
