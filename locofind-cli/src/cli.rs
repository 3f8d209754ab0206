use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{
    Confirm, CustomType, CustomUserError, Password, PasswordDisplayMode, validator::Validation,
};
use locofind_core::{
    Config, Coordinates, ListFetcher, LocationAcquirer, PositionSource, RequestState,
    provider::{
        lookups_from_config,
        position::{FixedPosition, IpPosition},
    },
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{prompt::PromptedPosition, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "locofind", version, about = "Find where you are and what the weather is like")]
pub struct Cli {
    /// Read and write this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional fixed location.
    Configure,

    /// Determine the current location and show its weather.
    Locate {
        /// Latitude in degrees; requires --lon.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in degrees; requires --lat.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Ignore the configured location and look up the position by IP address.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        ip: bool,

        /// Do not ask before looking up the position.
        #[arg(short, long)]
        yes: bool,
    },

    /// Fetch and list the placeholder posts.
    Posts,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        tracing::debug!(path = %config_path.display(), "using config file");

        match self.command {
            Command::Configure => configure(&config_path),
            Command::Locate { lat, lon, ip, yes } => {
                let config = Config::load_from(&config_path)?;
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                locate(&config, explicit, ip, yes).await
            }
            Command::Posts => {
                let config = Config::load_from(&config_path)?;
                posts(&config).await
            }
        }
    }
}

fn within_degrees(
    limit: f64,
    label: &'static str,
) -> impl Fn(&f64) -> Result<Validation, CustomUserError> + Clone {
    move |value: &f64| {
        Ok(if (-limit..=limit).contains(value) {
            Validation::Valid
        } else {
            Validation::Invalid(format!("{label} must be between -{limit} and {limit}").into())
        })
    }
}

fn configure(path: &Path) -> Result<()> {
    let mut config = Config::load_from(path)?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let fixed = Confirm::new("Use a fixed location instead of detecting it each time?")
        .with_default(config.location.is_some())
        .prompt()
        .context("Failed to read answer")?;

    config.location = if fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number, e.g. 12.9716")
            .with_validator(within_degrees(90.0, "Latitude"))
            .prompt()
            .context("Failed to read latitude")?;

        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number, e.g. 77.5946")
            .with_validator(within_degrees(180.0, "Longitude"))
            .prompt()
            .context("Failed to read longitude")?;

        Some(Coordinates::new(latitude, longitude))
    } else {
        None
    };

    config.save_to(path)?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn locate(
    config: &Config,
    explicit: Option<Coordinates>,
    by_ip: bool,
    assume_yes: bool,
) -> Result<()> {
    let lookups = lookups_from_config(config)?;

    let position: Arc<dyn PositionSource> = match (explicit, config.location) {
        (Some(coords), _) => Arc::new(FixedPosition(coords)),
        (None, Some(coords)) if !by_ip => {
            tracing::debug!(?coords, "using configured location");
            Arc::new(FixedPosition(coords))
        }
        _ => {
            tracing::debug!(prompt = !assume_yes, "locating by IP address");
            let source = IpPosition::new(config.endpoints.ip_locate_url.clone())?;
            if assume_yes {
                Arc::new(source)
            } else {
                Arc::new(PromptedPosition::new(source))
            }
        }
    };

    let acquirer = LocationAcquirer::new(position, lookups);
    let mut updates = acquirer.subscribe();

    let progress = async {
        let loading = updates
            .wait_for(|s| *s != RequestState::Idle)
            .await
            .is_ok_and(|state| state.is_loading());
        if loading {
            eprintln!("Locating...");
        }
    };

    let (settled, ()) = tokio::join!(acquirer.begin(), progress);

    match settled? {
        RequestState::Success { location, weather } => {
            println!("{}", render::location(&location));
            println!();
            println!("{}", render::weather(&weather));
            println!();
            println!("{}", render::background(weather.background()));
            Ok(())
        }
        RequestState::Failure(message) => {
            tracing::debug!(%message, "location cycle failed");
            anyhow::bail!(message)
        }
        other => anyhow::bail!("Location cycle ended in unexpected state: {other:?}"),
    }
}

async fn posts(config: &Config) -> Result<()> {
    let fetcher = ListFetcher::new(config.endpoints.posts_url.clone())?;

    let state = fetcher.mount().await;
    if let Some(message) = state.error() {
        tracing::debug!(%message, "posts fetch failed");
        anyhow::bail!("{message}");
    }

    println!("{}", render::posts(state.data()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn locate_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["locofind", "locate", "--lat", "-33.8688", "--lon", "151.2093"])
            .unwrap();

        match cli.command {
            Command::Locate { lat, lon, ip, yes } => {
                assert_eq!(lat, Some(-33.8688));
                assert_eq!(lon, Some(151.2093));
                assert!(!ip);
                assert!(!yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn latitude_requires_longitude() {
        assert!(Cli::try_parse_from(["locofind", "locate", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn ip_conflicts_with_explicit_coordinates() {
        let parsed =
            Cli::try_parse_from(["locofind", "locate", "--ip", "--lat", "1.0", "--lon", "2.0"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["locofind", "posts", "--config", "/tmp/locofind.toml"])
            .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/locofind.toml")));
        assert!(matches!(cli.command, Command::Posts));
    }

    #[tokio::test]
    async fn posts_failure_is_logged_and_returned() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut config = Config::default();
        config.endpoints.posts_url = "not a url".into();

        let err = posts(&config).await.unwrap_err();
        assert!(err.to_string().starts_with("Request failed"), "got: {err}");
    }
}
