use crate::{
    Config,
    error::PositionError,
    model::{Coordinates, WeatherRecord},
    provider::{nominatim::NominatimGeocoder, openweather::OpenWeatherClient},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc};

pub mod nominatim;
pub mod openweather;
pub mod position;

/// Sent with every request; Nominatim rejects anonymous clients.
pub const USER_AGENT: &str = concat!("locofind/", env!("CARGO_PKG_VERSION"));

/// Something that can tell where the device is.
///
/// Implementations may wait for as long as they need, e.g. on a consent prompt.
#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, PositionError>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    /// Human-readable address for `coords`, if the service knows one.
    async fn reverse(&self, coords: Coordinates) -> anyhow::Result<Option<String>>;
}

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, coords: Coordinates) -> anyhow::Result<WeatherRecord>;
}

/// The two lookups issued once coordinates are known.
#[derive(Debug, Clone)]
pub struct Lookups {
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub weather: Arc<dyn WeatherSource>,
}

/// Construct the geocoder and weather client from config.
pub fn lookups_from_config(config: &Config) -> anyhow::Result<Lookups> {
    let api_key = config.api_key()?;
    let http = http_client()?;
    let endpoints = &config.endpoints;

    Ok(Lookups {
        geocoder: Arc::new(NominatimGeocoder::with_client(
            http.clone(),
            endpoints.geocode_base.clone(),
        )),
        weather: Arc::new(OpenWeatherClient::with_client(
            http,
            endpoints.weather_base.clone(),
            endpoints.icon_base.clone(),
            api_key,
        )),
    })
}

pub(crate) fn http_client() -> reqwest::Result<Client> {
    Client::builder().user_agent(USER_AGENT).build()
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(lookups_from_config(&cfg).is_ok());
    }

    #[test]
    fn truncate_body_limits_long_bodies() {
        let long = "é".repeat(250);
        let short = truncate_body(&long);

        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 203);
        assert_eq!(truncate_body("ok"), "ok");
    }
}
