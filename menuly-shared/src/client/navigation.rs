/// Navigation helper
///
/// Client-side routers occasionally fail to transition (stale chunks after a
/// deploy, a route that throws while loading). [`navigate`] asks the router
/// first and, when that fails, falls back to a full page load so the user is
/// never stranded on the current page.
///
/// # Example
///
/// ```no_run
/// use menuly_shared::client::navigation::{navigate, Location, NavigateOptions, Router};
///
/// # async fn example(router: &dyn Router, location: &dyn Location) {
/// let attempted = navigate(router, location, "/dashboard", NavigateOptions::default()).await;
/// assert!(attempted);
/// # }
/// ```

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// Error type for cooperative navigation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// Router refused or failed the transition
    #[error("Navigation rejected: {0}")]
    Rejected(String),

    /// Router panicked during the transition
    #[error("Router panicked during navigation")]
    Panicked,
}

/// Cooperative client-side router
#[async_trait]
pub trait Router: Send + Sync {
    /// Transitions to `path` without a page load
    async fn push(&self, path: &str) -> Result<(), NavigationError>;
}

/// Unconditional location change (full page load)
pub trait Location: Send + Sync {
    fn assign(&self, path: &str);
}

/// Options for [`navigate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Perform a location change if the router fails
    pub fallback: bool,

    /// Wait before asking the router
    pub delay: Duration,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            fallback: true,
            delay: Duration::ZERO,
        }
    }
}

/// Navigates to `path`
///
/// # Returns
///
/// `true` if the router succeeded or the fallback was performed, `false` if
/// the router failed and fallback is disabled.
pub async fn navigate(
    router: &dyn Router,
    location: &dyn Location,
    path: &str,
    options: NavigateOptions,
) -> bool {
    if !options.delay.is_zero() {
        tokio::time::sleep(options.delay).await;
    }

    let outcome = AssertUnwindSafe(router.push(path))
        .catch_unwind()
        .await
        .unwrap_or(Err(NavigationError::Panicked));

    match outcome {
        Ok(()) => {
            tracing::debug!(path, "Navigated");
            true
        }
        Err(e) if options.fallback => {
            tracing::warn!(path, error = %e, "Router navigation failed, falling back to location change");
            location.assign(path);
            true
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "Router navigation failed");
            false
        }
    }
}
