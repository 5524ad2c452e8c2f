//! Adafruit IO REST client.
//!
//! `GET {base}/api/v2/{username}/feeds/{feed_key}/data?limit=1` with the key
//! in the `X-AIO-Key` header. The response is a JSON array of data points,
//! newest first.

use log::debug;
use reqwest::blocking::Client;

use super::{FeedDatum, FeedSource};
use crate::config::FeedConfig;
use crate::error::FetchError;

/// Blocking client for one Adafruit IO account.
pub struct AdafruitIoFeed {
    client: Client,
    base_url: String,
    username: String,
    key: String,
}

impl AdafruitIoFeed {
    /// Build a client with the configured request timeout.
    pub fn new(
        config: &FeedConfig,
        username: &str,
        key: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            key: key.to_string(),
        })
    }

    /// URL returning the newest data point of `feed_key`.
    pub fn data_url(
        &self,
        feed_key: &str,
    ) -> String {
        format!("{}/api/v2/{}/feeds/{}/data?limit=1", self.base_url, self.username, feed_key)
    }
}

impl FeedSource for AdafruitIoFeed {
    fn fetch_latest(
        &mut self,
        feed_key: &str,
    ) -> Result<Vec<FeedDatum>, FetchError> {
        let url = self.data_url(feed_key);
        debug!("GET {url}");

        let response = self.client.get(&url).header("X-AIO-Key", &self.key).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        parse_feed_data(&response.text()?)
    }
}

/// Parse a feed data response body.
pub fn parse_feed_data(body: &str) -> Result<Vec<FeedDatum>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}
