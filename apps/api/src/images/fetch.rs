use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use tracing::{info, warn};

use super::{ImageError, NewImage};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_FILE_NAME: &str = "image.jpg";

/// Source of remote images. `AppState` holds an `Arc<dyn ImageFetcher>`.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<NewImage, ImageError>;
}

/// Downloads publicly reachable images over HTTP(S).
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, ImageError> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<NewImage, ImageError> {
        let fail = |reason: String| ImageError::Fetch {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|e| fail(e.to_string()))?;
        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("status {status}")));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();
        if !mime_type.starts_with("image/") {
            return Err(ImageError::NotAnImage(url.to_string()));
        }

        let content = response.bytes().await.map_err(|e| fail(e.to_string()))?;

        Ok(NewImage {
            file_name: file_name_from_url(&parsed),
            mime_type,
            content,
        })
    }
}

/// Last non-empty path segment, or `image.jpg`.
pub fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}

/// One URL per line; blank lines ignored.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fetches every URL concurrently. Returns the successes and the failure count.
pub async fn fetch_all(fetcher: &dyn ImageFetcher, urls: &[String]) -> (Vec<NewImage>, usize) {
    let results = join_all(urls.iter().map(|url| fetcher.fetch(url))).await;

    let mut fetched = Vec::with_capacity(results.len());
    let mut failed = 0;
    for result in results {
        match result {
            Ok(image) => fetched.push(image),
            Err(e) => {
                warn!("Image fetch failed: {e}");
                failed += 1;
            }
        }
    }
    info!("Fetched {}/{} images", fetched.len(), urls.len());
    (fetched, failed)
}
