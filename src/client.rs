use crate::error::FetchError;
use crate::models::Palette;
use tracing::info;

/// HTTP client for the palette lookup service.
#[derive(Debug, Clone)]
pub struct LookupClient {
    client: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    const TIMEOUT_SECS: u64 = 10;

    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(Self::TIMEOUT_SECS))
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the service for more palettes of `mood`.
    ///
    /// An empty list is a successful answer. Any non-success status or
    /// transport problem is an error; nothing is retried.
    pub async fn fetch_palettes(&self, mood: &str) -> Result<Vec<Palette>, FetchError> {
        let url = format!(
            "{}/api/palettes/{}",
            self.base_url,
            urlencoding::encode(mood)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let palettes: Vec<Palette> = response.json().await.map_err(FetchError::Decode)?;
        info!("Fetched {} palettes for mood {}", palettes.len(), mood);
        Ok(palettes)
    }
}
