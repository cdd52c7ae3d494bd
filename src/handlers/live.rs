//! Live-web passthrough handler.

use crate::config::LayeredConfig;

/// Fetched live-web content, ready for the transport to relay.
#[derive(Debug)]
pub struct LiveResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Fetches content directly from the live web instead of an archival
/// index. Selected by the `$liveweb` sentinel in `index_paths`.
#[derive(Debug)]
pub struct LiveHandler {
    config: LayeredConfig,
    client: reqwest::Client,
}

impl LiveHandler {
    pub fn new(config: LayeredConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }

    /// Passthrough GET. A target without a scheme is assumed http.
    pub async fn fetch(&self, target: &str) -> Result<LiveResponse, reqwest::Error> {
        let target = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("http://{target}")
        };

        let response = self.client.get(&target).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(LiveResponse {
            status,
            content_type,
            body,
        })
    }
}
