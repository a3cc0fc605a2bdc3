use crate::{config::AppConfig, errors::ServiceError};
use futures::{stream, StreamExt};
use metrics::counter;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

/// Upper bound on listing pages followed, whatever page 1 reports.
const MAX_PAGES: u32 = 200;

/// One page of the platform's `/videos` listing
#[derive(Debug, Deserialize)]
struct VideoPage {
    #[serde(default)]
    videos: Vec<Value>,
    #[serde(default)]
    pages: Option<u32>,
}

/// Aggregated course catalog
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VideoCatalog {
    pub total_videos: usize,
    pub pages_total: u32,
    pub pages_fetched: u32,
    /// Pages that failed and were left out of `videos`
    pub pages_failed: u32,
    #[schema(value_type = Vec<Object>)]
    pub videos: Vec<Value>,
}

/// Client of the hosted video platform
#[derive(Debug, Clone)]
pub struct VideoCatalogClient {
    http: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
    page_size: u32,
    concurrency: usize,
}

impl VideoCatalogClient {
    pub fn new(
        base_url: Option<String>,
        api_key: Option<String>,
        page_size: u32,
        concurrency: usize,
    ) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            api_key,
            page_size,
            concurrency: concurrency.max(1),
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, ServiceError> {
        Self::new(
            cfg.video_api_base_url.clone(),
            cfg.video_api_key.clone(),
            cfg.video_page_size,
            cfg.video_page_concurrency,
        )
    }

    /// Fetches every listing page and concatenates the videos.
    ///
    /// Page 1 must succeed. Later pages are fetched concurrently and any that
    /// fail are dropped from the result and counted in `pages_failed`.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<VideoCatalog, ServiceError> {
        let base_url = self.base_url.as_deref().ok_or_else(|| {
            ServiceError::ExternalServiceError("Plataforma de vídeos não configurada".to_string())
        })?;

        let first = self.fetch_page(base_url, 1).await.map_err(|e| {
            counter!("aya_video.page_failures", 1);
            ServiceError::ExternalServiceError(format!("Falha ao listar vídeos: {}", e))
        })?;
        let pages_total = first.pages.unwrap_or(1).clamp(1, MAX_PAGES);
        debug!(pages_total, "First listing page fetched");

        let mut videos = first.videos;
        let mut pages_fetched = 1;
        let mut pages_failed = 0;

        let mut rest = stream::iter(2..=pages_total)
            .map(|page| async move { (page, self.fetch_page(base_url, page).await) })
            .buffer_unordered(self.concurrency);

        let mut fetched = Vec::new();
        while let Some((page, result)) = rest.next().await {
            match result {
                Ok(listing) => {
                    pages_fetched += 1;
                    fetched.push((page, listing.videos));
                }
                Err(e) => {
                    pages_failed += 1;
                    counter!("aya_video.page_failures", 1);
                    warn!(page, error = %e, "Dropping failed listing page");
                }
            }
        }

        // completion order is arbitrary; keep the platform's page order
        fetched.sort_by_key(|(page, _)| *page);
        videos.extend(fetched.into_iter().flat_map(|(_, v)| v));

        info!(
            pages_total,
            pages_fetched,
            pages_failed,
            total_videos = videos.len(),
            "Video catalog aggregated"
        );

        Ok(VideoCatalog {
            total_videos: videos.len(),
            pages_total,
            pages_fetched,
            pages_failed,
            videos,
        })
    }

    async fn fetch_page(&self, base_url: &str, page: u32) -> Result<VideoPage, reqwest::Error> {
        let mut request = self
            .http
            .get(format!("{}/videos", base_url))
            .query(&[("page", page), ("limit", self.page_size)]);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, key);
        }

        request
            .send()
            .await?
            .error_for_status()?
            .json::<VideoPage>()
            .await
    }
}
