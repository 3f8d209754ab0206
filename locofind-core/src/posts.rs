//! One-shot fetch of the placeholder post collection.

use anyhow::Context;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use crate::{error::ListError, model::PostRecord, provider::http_client};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ListState {
    #[default]
    Loading,
    Failed(String),
    Loaded(Vec<PostRecord>),
}

impl ListState {
    pub fn loading(&self) -> bool {
        matches!(self, ListState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ListState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Fetched posts; empty until a fetch succeeds.
    pub fn data(&self) -> &[PostRecord] {
        match self {
            ListState::Loaded(posts) => posts,
            _ => &[],
        }
    }
}

/// Fetches a collection resource the first time it is mounted.
#[derive(Debug)]
pub struct ListFetcher {
    url: String,
    http: Client,
    mounted: AtomicBool,
    state: watch::Sender<ListState>,
}

impl ListFetcher {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let http = http_client().context("Failed to build HTTP client")?;
        Ok(Self::with_client(http, url))
    }

    pub fn with_client(http: Client, url: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ListState::Loading);
        Self {
            url: url.into(),
            http,
            mounted: AtomicBool::new(false),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Issue the fetch on first call; later calls only report the current state.
    ///
    /// A mount that is dropped mid-fetch leaves the state at `Loading` and lets
    /// the next call fetch again.
    pub async fn mount(&self) -> ListState {
        if self.mounted.swap(true, Ordering::SeqCst) {
            tracing::debug!(url = %self.url, "list already mounted");
            return self.state();
        }

        let guard = MountGuard::new(&self.mounted);

        let next = match self.fetch().await {
            Ok(posts) => {
                tracing::info!(count = posts.len(), "posts loaded");
                ListState::Loaded(posts)
            }
            Err(err) => {
                tracing::warn!(url = %self.url, error = ?err, "posts fetch failed");
                ListState::Failed(err.to_string())
            }
        };

        self.state.send_replace(next.clone());
        guard.settle();
        next
    }

    async fn fetch(&self) -> Result<Vec<PostRecord>, ListError> {
        tracing::debug!(url = %self.url, "fetching posts");

        let res = self.http.get(&self.url).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ListError::Http { status });
        }

        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Re-arms the fetcher if `mount` is dropped before the fetch settles.
struct MountGuard<'a> {
    mounted: &'a AtomicBool,
    settled: bool,
}

impl<'a> MountGuard<'a> {
    fn new(mounted: &'a AtomicBool) -> Self {
        Self {
            mounted,
            settled: false,
        }
    }

    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for MountGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("list mount dropped before settling");
            self.mounted.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_loading_with_no_data() {
        let fetcher = ListFetcher::with_client(Client::new(), "http://posts.test");
        let state = fetcher.state();

        assert!(state.loading());
        assert!(state.error().is_none());
        assert!(state.data().is_empty());
    }

    #[test]
    fn failed_state_exposes_message_and_empty_data() {
        let state = ListState::Failed("Network response was not ok".into());

        assert!(!state.loading());
        assert_eq!(state.error(), Some("Network response was not ok"));
        assert!(state.data().is_empty());
    }
}
