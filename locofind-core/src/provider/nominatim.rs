use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::Coordinates,
    provider::{ReverseGeocoder, http_client, truncate_body},
};

/// Reverse geocoding against an OpenStreetMap Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = http_client().context("Failed to build HTTP client")?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NmReverseResponse {
    display_name: Option<String>,
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coords: Coordinates) -> Result<Option<String>> {
        let url = format!("{}/reverse", self.base_url.trim_end_matches('/'));
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();

        tracing::debug!(%url, %lat, %lon, "reverse geocoding");

        let res = self
            .http
            .get(&url)
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await
            .context("Failed to send request to Nominatim (reverse)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Nominatim reverse response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Nominatim reverse request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: NmReverseResponse =
            serde_json::from_str(&body).context("Failed to parse Nominatim reverse JSON")?;

        Ok(parsed.display_name)
    }
}
