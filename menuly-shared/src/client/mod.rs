/// Client-side session flow
///
/// The browser half of authentication, expressed against small traits so it
/// can be driven by any UI shell (and by tests):
///
/// - [`navigation`]: cooperative route change with a hard location fallback
/// - [`guard`]: renders protected content only once a session is confirmed
///
/// The UI shell implements [`Router`] (its client-side router) and
/// [`Location`] (a full page load).

pub mod guard;
pub mod navigation;

pub use guard::{
    GuardOptions, GuardState, RedirectPlan, RedirectStep, Render, RouteGuard, SessionSource,
    StoredSession,
};
pub use navigation::{navigate, Location, NavigateOptions, NavigationError, Router};
