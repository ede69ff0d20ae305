use crate::config::FetchSettings;
use crate::fetcher::{
    backoff::retry_delay,
    errors::FetchError,
    pipeline::{decode_body, detect_encoding},
    types::PageResponse,
};
use reqwest::{
    Client, ClientBuilder,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// The question pages sit behind a CDN that turns away obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGES: &str = "ru-RU,ru;q=0.9,en-US;q=0.5,en;q=0.3";

/// HTTP fetcher with bounded retries for transient failures.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    backoff: Duration,
}

impl Fetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGES));

        let client = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT.min(settings.timeout))
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_retries: settings.max_retries,
            backoff: settings.backoff,
        })
    }

    /// GET `url`, retrying connection failures and retriable statuses.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        let parsed_url = Url::parse(url)?;
        let mut retry = 0;

        loop {
            match self.fetch_once(parsed_url.clone()).await {
                Ok(mut page) => {
                    page.attempts = retry + 1;
                    return Ok(page);
                }
                Err(err) if err.should_retry() && retry < self.max_retries => {
                    retry += 1;
                    let delay = retry_delay(retry, self.backoff);
                    warn!(
                        error = %err,
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        "transient fetch failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) if err.should_retry() => {
                    return Err(FetchError::RetriesExhausted {
                        attempts: retry + 1,
                        last: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self, url: Url) -> Result<PageResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http(status));
        }

        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let url_final = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body_raw = response
            .bytes()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Content-Length may be missing or wrong for compressed bodies.
        if body_raw.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_raw.len() as u64));
        }

        let encoding = detect_encoding(&content_type, &body_raw);
        let body_utf8 = decode_body(&body_raw, encoding);
        debug!(
            status = %status,
            encoding = encoding.name(),
            bytes = body_raw.len(),
            "page downloaded"
        );

        Ok(PageResponse {
            url_final,
            status,
            body_raw,
            body_utf8,
            encoding,
            attempts: 1,
        })
    }
}
