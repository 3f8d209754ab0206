use reqwest::StatusCode;

/// Fallback when the position source gives no usable message.
pub const LOCATION_FALLBACK: &str = "Could not retrieve location";

/// Message shown when either lookup of a cycle fails.
pub const LOOKUP_FAILED: &str = "Could not retrieve location or weather information";

/// Failure reported by a [`PositionSource`](crate::provider::PositionSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Geolocation is not supported on this system")]
    Unsupported,
    #[error("{}", message_or_fallback(.0))]
    Denied(Option<String>),
    #[error("{}", message_or_fallback(.0))]
    Unavailable(Option<String>),
}

/// Why an acquisition cycle ended in failure. `Display` is the user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("Geolocation is not supported on this system")]
    GeolocationUnsupported,
    #[error("{}", message_or_fallback(.0))]
    Position(Option<String>),
    #[error("Could not retrieve location or weather information")]
    NetworkOrParse(#[source] anyhow::Error),
}

impl From<PositionError> for AcquireError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::Unsupported => AcquireError::GeolocationUnsupported,
            PositionError::Denied(message) | PositionError::Unavailable(message) => {
                AcquireError::Position(message)
            }
        }
    }
}

/// Returned by `begin` while a cycle is already loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("A location request is already in progress")]
pub struct CycleInProgress;

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("Network response was not ok")]
    Http { status: StatusCode },
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

fn message_or_fallback(message: &Option<String>) -> &str {
    message
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(LOCATION_FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_keeps_platform_message() {
        let err = AcquireError::from(PositionError::Denied(Some("User denied Geolocation".into())));
        assert_eq!(err.to_string(), "User denied Geolocation");
    }

    #[test]
    fn missing_or_empty_message_uses_fallback() {
        assert_eq!(AcquireError::from(PositionError::Denied(None)).to_string(), LOCATION_FALLBACK);
        assert_eq!(
            AcquireError::from(PositionError::Unavailable(Some(String::new()))).to_string(),
            LOCATION_FALLBACK
        );
    }

    #[test]
    fn whitespace_message_is_kept() {
        let err = AcquireError::from(PositionError::Denied(Some(" ".into())));
        assert_eq!(err.to_string(), " ");
    }

    #[test]
    fn lookup_failure_hides_cause() {
        let err = AcquireError::NetworkOrParse(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), LOOKUP_FAILED);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unsupported_maps_across() {
        let err = AcquireError::from(PositionError::Unsupported);
        assert!(matches!(err, AcquireError::GeolocationUnsupported));
    }
}
