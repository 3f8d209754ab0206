use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback shown when reverse geocoding yields no display name.
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

/// A device position in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub coordinates: Coordinates,
    pub address: String,
}

impl LocationRecord {
    /// Empty and missing display names both fall back to [`ADDRESS_NOT_FOUND`].
    pub fn new(coordinates: Coordinates, display_name: Option<String>) -> Self {
        let address = display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ADDRESS_NOT_FOUND.to_string());

        Self { coordinates, address }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Degrees Celsius, rounded.
    pub temperature: i32,
    /// Degrees Celsius, rounded.
    pub feels_like: i32,
    pub humidity: u8,
    /// Metres per second.
    pub wind_speed: f64,
    pub description: String,
    pub icon_url: String,
    pub observed_at: DateTime<Utc>,
}

impl WeatherRecord {
    pub fn background(&self) -> BackgroundBand {
        BackgroundBand::for_temperature(self.temperature)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: u64,
    pub title: String,
}

/// State of one acquisition cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success {
        location: LocationRecord,
        weather: WeatherRecord,
    },
    Failure(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&LocationRecord> {
        match self {
            RequestState::Success { location, .. } => Some(location),
            _ => None,
        }
    }

    pub fn weather(&self) -> Option<&WeatherRecord> {
        match self {
            RequestState::Success { weather, .. } => Some(weather),
            _ => None,
        }
    }

    /// Background treatment for the current state; neutral without weather.
    pub fn background(&self) -> BackgroundBand {
        self.weather()
            .map(WeatherRecord::background)
            .unwrap_or(BackgroundBand::Neutral)
    }
}

/// Visual treatment keyed on the current temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackgroundBand {
    Neutral,
    Cold,
    Cool,
    Warm,
    Hot,
}

impl BackgroundBand {
    /// Upper bounds are exclusive: 10 is `Cool`, 30 is `Hot`.
    pub fn for_temperature(celsius: i32) -> Self {
        if celsius < 10 {
            BackgroundBand::Cold
        } else if celsius < 20 {
            BackgroundBand::Cool
        } else if celsius < 30 {
            BackgroundBand::Warm
        } else {
            BackgroundBand::Hot
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundBand::Neutral => "neutral",
            BackgroundBand::Cold => "cold",
            BackgroundBand::Cool => "cool",
            BackgroundBand::Warm => "warm",
            BackgroundBand::Hot => "hot",
        }
    }
}

impl std::fmt::Display for BackgroundBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounds to the nearest integer with halves going towards positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    let nearest = value.round();
    // `round` sends negative halves away from zero; pull them back up.
    if value - nearest == 0.5 {
        (nearest + 1.0) as i32
    } else {
        nearest as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(28.3), 28);
        assert_eq!(round_half_up(30.1), 30);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(0.49999999999999994), 0);
        assert_eq!(round_half_up(-0.5), 0);
    }

    #[test]
    fn band_boundaries_are_exclusive_upper_bounds() {
        assert_eq!(BackgroundBand::for_temperature(-5), BackgroundBand::Cold);
        assert_eq!(BackgroundBand::for_temperature(9), BackgroundBand::Cold);
        assert_eq!(BackgroundBand::for_temperature(10), BackgroundBand::Cool);
        assert_eq!(BackgroundBand::for_temperature(19), BackgroundBand::Cool);
        assert_eq!(BackgroundBand::for_temperature(20), BackgroundBand::Warm);
        assert_eq!(BackgroundBand::for_temperature(29), BackgroundBand::Warm);
        assert_eq!(BackgroundBand::for_temperature(30), BackgroundBand::Hot);
        assert_eq!(BackgroundBand::for_temperature(45), BackgroundBand::Hot);
    }

    #[test]
    fn idle_state_has_neutral_background() {
        assert_eq!(RequestState::Idle.background(), BackgroundBand::Neutral);
        assert_eq!(RequestState::Failure("x".into()).background(), BackgroundBand::Neutral);
    }

    #[test]
    fn missing_or_empty_display_name_falls_back() {
        let coords = Coordinates::new(1.0, 2.0);

        assert_eq!(LocationRecord::new(coords, None).address, ADDRESS_NOT_FOUND);
        assert_eq!(LocationRecord::new(coords, Some(String::new())).address, ADDRESS_NOT_FOUND);
        assert_eq!(
            LocationRecord::new(coords, Some("Bengaluru, India".into())).address,
            "Bengaluru, India"
        );
        assert_eq!(LocationRecord::new(coords, Some(" ".into())).address, " ");
    }
}
