use chrono::Local;
use locofind_core::{BackgroundBand, LocationRecord, PostRecord, WeatherRecord};

pub fn location(record: &LocationRecord) -> String {
    format!(
        "Location Details\n  Latitude:  {:.4}\n  Longitude: {:.4}\n  Address:   {}",
        record.coordinates.latitude, record.coordinates.longitude, record.address
    )
}

pub fn weather(record: &WeatherRecord) -> String {
    let observed = record.observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");

    format!(
        "Weather\n  {}°C, {}\n  Feels like: {}°C\n  Humidity:   {}%\n  Wind speed: {} m/s\n  Icon:       {}\n  Observed:   {}",
        record.temperature,
        record.description,
        record.feels_like,
        record.humidity,
        record.wind_speed,
        record.icon_url,
        observed,
    )
}

pub fn background(band: BackgroundBand) -> String {
    format!("Background: {band}")
}

pub fn posts(posts: &[PostRecord]) -> String {
    let mut out = String::from("API Data:");
    for post in posts {
        out.push_str(&format!("\n  {}: {}", post.id, post.title));
    }
    out
}
