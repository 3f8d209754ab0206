//! User-triggered location and weather acquisition.
//!
//! A cycle moves `Idle → Loading → Success | Failure`. Only one cycle may be
//! loading at a time; the next call to [`LocationAcquirer::begin`] after
//! settlement replaces whatever the previous cycle left behind.

use anyhow::Context;
use std::sync::Arc;
use tokio::sync::watch;

use crate::{
    error::{AcquireError, CycleInProgress},
    model::{BackgroundBand, LocationRecord, RequestState, WeatherRecord},
    provider::{Lookups, PositionSource},
};

pub struct LocationAcquirer {
    position: Arc<dyn PositionSource>,
    lookups: Lookups,
    state: watch::Sender<RequestState>,
}

impl LocationAcquirer {
    pub fn new(position: Arc<dyn PositionSource>, lookups: Lookups) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            position,
            lookups,
            state,
        }
    }

    /// Observe every state transition.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    pub fn background(&self) -> BackgroundBand {
        self.state.borrow().background()
    }

    /// Run one acquisition cycle and return the state it settled in.
    ///
    /// Fails with [`CycleInProgress`] without touching the state if another
    /// cycle is still loading.
    pub async fn begin(&self) -> Result<RequestState, CycleInProgress> {
        let started = self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = RequestState::Loading;
            true
        });

        if !started {
            tracing::debug!("location cycle already in progress");
            return Err(CycleInProgress);
        }

        let guard = SettleGuard::new(&self.state);
        tracing::info!("location cycle started");

        let next = match self.run_cycle().await {
            Ok((location, weather)) => {
                tracing::info!(
                    address = %location.address,
                    temperature = weather.temperature,
                    "location cycle succeeded"
                );
                RequestState::Success { location, weather }
            }
            Err(err) => {
                match &err {
                    AcquireError::NetworkOrParse(cause) => {
                        tracing::warn!("location lookups failed: {cause:#}")
                    }
                    other => tracing::warn!(error = %other, "device position unavailable"),
                }
                RequestState::Failure(err.to_string())
            }
        };

        guard.settle(next.clone());
        Ok(next)
    }

    async fn run_cycle(&self) -> Result<(LocationRecord, WeatherRecord), AcquireError> {
        let coords = self.position.locate().await?;
        tracing::debug!(
            latitude = coords.latitude,
            longitude = coords.longitude,
            "device position acquired"
        );

        let (address, weather) = tokio::join!(
            self.lookups.geocoder.reverse(coords),
            self.lookups.weather.current(coords),
        );

        let address = address
            .context("Reverse geocoding failed")
            .map_err(AcquireError::NetworkOrParse)?;
        let weather = weather
            .context("Weather lookup failed")
            .map_err(AcquireError::NetworkOrParse)?;

        Ok((LocationRecord::new(coords, address), weather))
    }
}

impl std::fmt::Debug for LocationAcquirer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationAcquirer")
            .field("position", &self.position)
            .field("lookups", &self.lookups)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// Puts the state back to `Idle` if a cycle is dropped before it settles.
struct SettleGuard<'a> {
    state: &'a watch::Sender<RequestState>,
    settled: bool,
}

impl<'a> SettleGuard<'a> {
    fn new(state: &'a watch::Sender<RequestState>) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    fn settle(mut self, next: RequestState) {
        self.state.send_replace(next);
        self.settled = true;
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("location cycle dropped before settling");
            self.state.send_replace(RequestState::Idle);
        }
    }
}
