use async_trait::async_trait;
use inquire::{Confirm, InquireError};
use locofind_core::{Coordinates, PositionError, PositionSource};

pub const DENIED_MESSAGE: &str = "User denied Geolocation";

/// Asks for consent on the terminal before delegating to `inner`.
#[derive(Debug)]
pub struct PromptedPosition<S> {
    inner: S,
}

impl<S> PromptedPosition<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: PositionSource> PositionSource for PromptedPosition<S> {
    async fn locate(&self) -> Result<Coordinates, PositionError> {
        let answer = tokio::task::spawn_blocking(|| {
            Confirm::new("Allow locofind to look up your approximate location?")
                .with_default(true)
                .with_help_message("Your public IP address is sent to the lookup service")
                .prompt()
        })
        .await
        .map_err(|e| PositionError::Unavailable(Some(e.to_string())))?;

        consent_outcome(answer)?;
        self.inner.locate().await
    }
}

fn consent_outcome(answer: Result<bool, InquireError>) -> Result<(), PositionError> {
    match answer {
        Ok(true) => Ok(()),
        Ok(false)
        | Err(InquireError::OperationCanceled)
        | Err(InquireError::OperationInterrupted) => {
            Err(PositionError::Denied(Some(DENIED_MESSAGE.to_string())))
        }
        Err(InquireError::NotTTY) => Err(PositionError::Denied(Some(
            "Cannot ask for location permission without a terminal; pass --yes to allow".into(),
        ))),
        Err(other) => Err(PositionError::Unavailable(Some(other.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declining_is_a_denial() {
        assert_eq!(
            consent_outcome(Ok(false)),
            Err(PositionError::Denied(Some(DENIED_MESSAGE.into())))
        );
        assert_eq!(
            consent_outcome(Err(InquireError::OperationCanceled)),
            Err(PositionError::Denied(Some(DENIED_MESSAGE.into())))
        );
    }

    #[test]
    fn accepting_lets_the_lookup_run() {
        assert_eq!(consent_outcome(Ok(true)), Ok(()));
    }

    #[test]
    fn missing_terminal_suggests_yes_flag() {
        let err = consent_outcome(Err(InquireError::NotTTY)).unwrap_err();
        assert!(err.to_string().contains("--yes"));
    }
}
