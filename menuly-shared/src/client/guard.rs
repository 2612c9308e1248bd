/// Route guard
///
/// Wraps protected content. A guard starts in [`GuardState::Loading`] and
/// settles exactly once, on the first [`RouteGuard::mount`]:
///
/// ```text
/// Loading ──session──▶ Authenticated
///    │
///    └──no session / error──▶ Unauthenticated ──▶ redirect to login
/// ```
///
/// The redirect is a [`RedirectPlan`] of two independent steps: a cooperative
/// navigation through the [`navigate`] helper, then a hard location change
/// after `fallback_delay`. The second step runs on a tokio task and is
/// cancelled by [`RouteGuard::unmount`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use menuly_shared::client::guard::{GuardOptions, Render, RouteGuard, SessionSource};
/// use menuly_shared::client::navigation::{Location, Router};
///
/// # async fn example(source: Arc<dyn SessionSource>, router: Arc<dyn Router>, location: Arc<dyn Location>) {
/// let mut guard = RouteGuard::new(source, router, location, GuardOptions::default());
/// assert!(matches!(guard.render(|| "dashboard"), Render::Placeholder));
///
/// guard.mount().await;
/// match guard.render(|| "dashboard") {
///     Render::Children(page) => println!("{}", page),
///     _ => println!("redirecting"),
/// }
/// # }
/// ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::navigation::{navigate, Location, NavigateOptions, Router};
use crate::auth::session::{Session, SessionCredentials, SessionResolver};
use crate::baas::BaasResult;

/// Default login path
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Default delay before the hard fallback
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(2000);

/// Where the guard gets the current session from
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn current_session(&self) -> BaasResult<Option<Session>>;
}

/// Session source backed by a stored access token
pub struct StoredSession {
    resolver: SessionResolver,
    credentials: Option<SessionCredentials>,
}

impl StoredSession {
    pub fn new(resolver: SessionResolver, credentials: Option<SessionCredentials>) -> Self {
        Self {
            resolver,
            credentials,
        }
    }
}

#[async_trait]
impl SessionSource for StoredSession {
    async fn current_session(&self) -> BaasResult<Option<Session>> {
        self.resolver.resolve(self.credentials.as_ref()).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardState {
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

/// What the guard shows
///
/// Placeholder and children are separate variants, so they can never be
/// shown together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Render<T> {
    Placeholder,
    Children(T),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOptions {
    pub login_path: String,
    pub fallback_delay: Duration,
}

impl Default for GuardOptions {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            fallback_delay: DEFAULT_FALLBACK_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectStep {
    /// Ask the client router, with the navigation helper's own fallback
    Cooperative { path: String },

    /// Full page load once `after` has elapsed
    Hard { path: String, after: Duration },
}

/// Ordered redirect steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPlan {
    pub steps: Vec<RedirectStep>,
}

impl RedirectPlan {
    /// Cooperative navigation to the login path, then a delayed hard change
    pub fn to_login(options: &GuardOptions) -> Self {
        Self {
            steps: vec![
                RedirectStep::Cooperative {
                    path: options.login_path.clone(),
                },
                RedirectStep::Hard {
                    path: options.login_path.clone(),
                    after: options.fallback_delay,
                },
            ],
        }
    }
}

pub struct RouteGuard {
    source: Arc<dyn SessionSource>,
    router: Arc<dyn Router>,
    location: Arc<dyn Location>,
    options: GuardOptions,
    state: GuardState,
    redirect: Option<RedirectPlan>,
    cancel: CancellationToken,
    fallback: Option<JoinHandle<()>>,
}

impl RouteGuard {
    pub fn new(
        source: Arc<dyn SessionSource>,
        router: Arc<dyn Router>,
        location: Arc<dyn Location>,
        options: GuardOptions,
    ) -> Self {
        Self {
            source,
            router,
            location,
            options,
            state: GuardState::Loading,
            redirect: None,
            cancel: CancellationToken::new(),
            fallback: None,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// The redirect executed on mount, if any
    pub fn redirect_plan(&self) -> Option<&RedirectPlan> {
        self.redirect.as_ref()
    }

    /// Renders for the current state; `children` is only called when
    /// authenticated
    pub fn render<T>(&self, children: impl FnOnce() -> T) -> Render<T> {
        match self.state {
            GuardState::Loading => Render::Placeholder,
            GuardState::Authenticated(_) => Render::Children(children()),
            GuardState::Unauthenticated => Render::Nothing,
        }
    }

    /// Queries the session source and settles
    ///
    /// Only the first call queries; later calls return the settled state.
    pub async fn mount(&mut self) -> &GuardState {
        if self.state != GuardState::Loading {
            return &self.state;
        }

        let outcome = self.source.current_session().await;
        match outcome {
            Ok(Some(session)) => {
                tracing::debug!(user_id = %session.user_id, "Guard authenticated");
                self.state = GuardState::Authenticated(session);
            }
            Ok(None) => {
                tracing::debug!("No session, redirecting to login");
                self.unauthenticated().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed, redirecting to login");
                self.unauthenticated().await;
            }
        }

        &self.state
    }

    /// Cancels a pending hard fallback
    pub fn unmount(&mut self) {
        self.cancel.cancel();
    }

    /// Handle of the scheduled hard fallback task
    pub fn take_fallback(&mut self) -> Option<JoinHandle<()>> {
        self.fallback.take()
    }

    async fn unauthenticated(&mut self) {
        self.state = GuardState::Unauthenticated;

        let plan = RedirectPlan::to_login(&self.options);
        for step in &plan.steps {
            match step {
                RedirectStep::Cooperative { path } => {
                    navigate(
                        self.router.as_ref(),
                        self.location.as_ref(),
                        path,
                        NavigateOptions::default(),
                    )
                    .await;
                }
                RedirectStep::Hard { path, after } => {
                    self.fallback = Some(self.schedule_hard(path.clone(), *after));
                }
            }
        }
        self.redirect = Some(plan);
    }

    fn schedule_hard(&self, path: String, after: Duration) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        let location = Arc::clone(&self.location);

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(%path, "Hard redirect cancelled");
                }
                _ = tokio::time::sleep(after) => {
                    tracing::debug!(%path, "Hard redirect");
                    location.assign(&path);
                }
            }
        })
    }
}
