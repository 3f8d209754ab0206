use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::{Coordinates, WeatherRecord, round_half_up},
    provider::{WeatherSource, http_client, truncate_body},
};

/// Current-conditions lookup against the OpenWeather 2.5 API, in metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    icon_base: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        icon_base: impl Into<String>,
        api_key: String,
    ) -> Result<Self> {
        let http = http_client().context("Failed to build HTTP client")?;
        Ok(Self::with_client(http, base_url, icon_base, api_key))
    }

    pub fn with_client(
        http: Client,
        base_url: impl Into<String>,
        icon_base: impl Into<String>,
        api_key: String,
    ) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            icon_base: icon_base.into(),
            http,
        }
    }

    pub fn icon_url(&self, code: &str) -> String {
        format!("{}/{}@2x.png", self.icon_base.trim_end_matches('/'), code)
    }

    fn build_record(&self, parsed: OwCurrentResponse) -> Result<WeatherRecord> {
        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather response contained no weather conditions"))?;

        let observed_at = parsed
            .dt
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        Ok(WeatherRecord {
            temperature: round_half_up(parsed.main.temp),
            feels_like: round_half_up(parsed.main.feels_like),
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            description: condition.description,
            icon_url: self.icon_url(&condition.icon),
            observed_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, coords: Coordinates) -> Result<WeatherRecord> {
        let url = format!("{}/weather", self.base_url.trim_end_matches('/'));
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();

        tracing::debug!(%url, %lat, %lon, "fetching current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        self.build_record(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenWeatherClient {
        OpenWeatherClient::with_client(
            Client::new(),
            "http://weather.test",
            "https://icons.test/img/wn/",
            "KEY".into(),
        )
    }

    #[test]
    fn maps_response_to_record() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "dt": 1_700_000_000,
            "main": { "temp": 28.3, "feels_like": 30.1, "humidity": 60 },
            "wind": { "speed": 3.2 },
            "weather": [{ "description": "clear sky", "icon": "01d" }]
        }))
        .unwrap();

        let record = client().build_record(parsed).unwrap();

        assert_eq!(record.temperature, 28);
        assert_eq!(record.feels_like, 30);
        assert_eq!(record.humidity, 60);
        assert_eq!(record.wind_speed, 3.2);
        assert_eq!(record.description, "clear sky");
        assert_eq!(record.icon_url, "https://icons.test/img/wn/01d@2x.png");
        assert_eq!(record.observed_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn empty_condition_list_is_an_error() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "main": { "temp": 1.0, "feels_like": 1.0, "humidity": 1 },
            "wind": { "speed": 0.0 },
            "weather": []
        }))
        .unwrap();

        let err = client().build_record(parsed).unwrap_err();
        assert!(err.to_string().contains("no weather conditions"));
    }

    #[test]
    fn missing_nested_field_fails_to_parse() {
        let parsed = serde_json::from_value::<OwCurrentResponse>(serde_json::json!({
            "wind": { "speed": 0.0 },
            "weather": []
        }));

        assert!(parsed.is_err());
    }
}
