// src/services/fetcher.rs

//! Redirect-aware feed fetching.
//!
//! Fetches a feed's index document while handling redirects explicitly. A
//! permanent redirect (301) rewrites the feed's persisted URL the moment it
//! is seen: the server told us the feed moved, so a failure later in the
//! chain must not undo the move. The audit message is appended before the
//! URL is persisted.

use thiserror::Error;
use url::Url;

use crate::error::AppError;
use crate::models::{Feed, FetcherConfig, MessageBody, Subject};
use crate::storage::Store;
use crate::utils::http::Transport;

/// Feed-level fetch failure; mapped onto audit messages by the updater.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The configured URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Redirect chain exceeded the allowed depth, or following is disabled
    #[error("too many redirects")]
    TooManyRedirects,

    /// The server answered with a non-success status
    #[error("HTTP status {code}")]
    Http { code: u16 },

    /// DNS, timeout or connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Infrastructure fault while persisting the URL update
    #[error(transparent)]
    Store(AppError),
}

/// Redirect handling options.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Whether to follow redirects at all
    pub follow: bool,
    /// Maximum redirects to follow
    pub depth: u32,
    /// Whether a permanent redirect rewrites the persisted URL
    pub update: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            follow: true,
            depth: 2,
            update: true,
        }
    }
}

impl From<&FetcherConfig> for FetchOptions {
    fn from(config: &FetcherConfig) -> Self {
        Self {
            follow: config.follow,
            depth: config.depth,
            update: config.update,
        }
    }
}

/// Fetches index documents for feeds.
pub struct FeedFetcher<'a> {
    store: &'a dyn Store,
    transport: &'a dyn Transport,
    options: FetchOptions,
}

impl<'a> FeedFetcher<'a> {
    pub fn new(store: &'a dyn Store, transport: &'a dyn Transport, options: FetchOptions) -> Self {
        Self {
            store,
            transport,
            options,
        }
    }

    /// Fetch the index document for `feed`.
    ///
    /// `Ok(None)` means the feed has no URL configured ("no data", not an
    /// error). On a permanent redirect, `feed.index_url` is updated in place
    /// alongside the persisted record.
    pub async fn fetch(&self, feed: &mut Feed) -> Result<Option<Vec<u8>>, FetchError> {
        if feed.index_url.trim().is_empty() {
            return Ok(None);
        }

        let url = Url::parse(&feed.index_url)?;
        let remaining = if self.options.follow {
            self.options.depth
        } else {
            0
        };
        let body = self.follow_chain(feed, url, remaining).await?;
        Ok(Some(body))
    }

    async fn follow_chain(
        &self,
        feed: &mut Feed,
        mut url: Url,
        mut remaining: u32,
    ) -> Result<Vec<u8>, FetchError> {
        loop {
            let response = self
                .transport
                .get(&url)
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            if response.is_redirect() {
                if !self.options.follow || remaining == 0 {
                    return Err(FetchError::TooManyRedirects);
                }

                // Location may be relative; resolve against the current URL.
                let location = response.location.as_deref().unwrap_or_default();
                let target = url.join(location)?;

                if response.status == 301 && self.options.update {
                    self.update_url(feed, target.as_str()).await?;
                }

                url = target;
                remaining -= 1;
                continue;
            }

            if response.is_success() {
                return Ok(response.body);
            }
            return Err(FetchError::Http {
                code: response.status,
            });
        }
    }

    /// Log the move, then persist the new URL.
    async fn update_url(&self, feed: &mut Feed, new_url: &str) -> Result<(), FetchError> {
        log::warn!(
            "Updating index URL of feed '{}' to '{}'",
            feed.name,
            new_url
        );
        self.store
            .append_message(
                Subject::Feed(feed.id),
                MessageBody::FeedUrlUpdatedInfo {
                    old_url: Some(feed.index_url.clone()),
                    new_url: Some(new_url.to_string()),
                },
            )
            .await
            .map_err(FetchError::Store)?;
        self.store
            .update_feed_url(feed.id, new_url)
            .await
            .map_err(FetchError::Store)?;
        feed.index_url = new_url.to_string();
        Ok(())
    }
}
