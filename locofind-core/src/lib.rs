//! Core library for the `locofind` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstractions over position, geocoding and weather sources
//! - The location/weather acquisition cycle and the post list fetcher
//! - Shared domain models (records, request states)
//!
//! It is used by `locofind-cli`, but can also be reused by other front ends.

pub mod acquirer;
pub mod config;
pub mod error;
pub mod model;
pub mod posts;
pub mod provider;

pub use acquirer::LocationAcquirer;
pub use config::{Config, Endpoints, OpenWeatherConfig};
pub use error::{AcquireError, CycleInProgress, ListError, PositionError};
pub use model::{
    BackgroundBand, Coordinates, LocationRecord, PostRecord, RequestState, WeatherRecord,
};
pub use posts::{ListFetcher, ListState};
pub use provider::{Lookups, PositionSource, ReverseGeocoder, WeatherSource};
