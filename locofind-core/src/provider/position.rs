use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::PositionError,
    model::Coordinates,
    provider::{PositionSource, http_client},
};

/// Always reports the same coordinates, e.g. from flags or the config file.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn locate(&self) -> Result<Coordinates, PositionError> {
        Ok(self.0)
    }
}

/// Used when the host offers no way to locate itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPosition;

#[async_trait]
impl PositionSource for UnsupportedPosition {
    async fn locate(&self) -> Result<Coordinates, PositionError> {
        Err(PositionError::Unsupported)
    }
}

/// Approximate position derived from the public IP address.
#[derive(Debug, Clone)]
pub struct IpPosition {
    url: String,
    http: Client,
}

impl IpPosition {
    pub fn new(url: impl Into<String>) -> Result<Self, PositionError> {
        let http = http_client().map_err(|e| PositionError::Unavailable(Some(e.to_string())))?;
        Ok(Self::with_client(http, url))
    }

    pub fn with_client(http: Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLocateResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    reason: Option<String>,
}

#[async_trait]
impl PositionSource for IpPosition {
    async fn locate(&self) -> Result<Coordinates, PositionError> {
        tracing::debug!(url = %self.url, "locating by IP address");

        let res = self.http.get(&self.url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "IP location request failed");
            PositionError::Unavailable(None)
        })?;

        let status = res.status();
        let parsed: IpLocateResponse = res.json().await.map_err(|e| {
            tracing::warn!(%status, error = %e, "IP location response was not understood");
            PositionError::Unavailable(None)
        })?;

        match (parsed.latitude, parsed.longitude) {
            (Some(latitude), Some(longitude)) if status.is_success() => {
                Ok(Coordinates::new(latitude, longitude))
            }
            _ => Err(PositionError::Unavailable(parsed.reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_position_returns_its_coordinates() {
        let coords = Coordinates::new(12.9716, 77.5946);
        assert_eq!(FixedPosition(coords).locate().await, Ok(coords));
    }

    #[tokio::test]
    async fn unsupported_position_always_fails() {
        assert_eq!(UnsupportedPosition.locate().await, Err(PositionError::Unsupported));
    }
}
