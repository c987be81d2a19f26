//! The navigation guard: decides, per transition, whether to proceed.
//!
//! Every route change goes through [`NavigationGuard::before_each`]. The
//! decision depends only on the target path and the session phase:
//!
//! ```text
//!                     target == login          target != login
//!   NoToken            proceed                  → login?redirect=<target>
//!   TokenNoIdentity    → home                   fetch identity, then
//!                                                 proceed, or invalidate
//!                                                 and → login?redirect=<target>
//!   TokenWithIdentity  → home                   proceed
//! ```
//!
//! The only suspension point is the identity fetch. The transition does
//! not settle until that fetch does.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use adminward_session::{AuthService, Notice, Notifier, SessionPhase, SessionStore};

use crate::{Location, RouteTable};

// ---------------------------------------------------------------------------
// GuardConfig
// ---------------------------------------------------------------------------

/// Paths and texts the guard works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// The one path reachable without a token.
    pub login_path: String,
    /// Where an authenticated operator asking for login is sent.
    pub home_path: String,
    /// Where unmatched paths end up.
    pub not_found_path: String,
    /// Query parameter carrying the originally requested path.
    pub redirect_param: String,
    /// Page title for routes without one.
    pub default_title: String,
    /// Notice shown when the identity fetch fails without a message of
    /// its own.
    pub auth_failure_message: String,
    pub notice_duration: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".into(),
            home_path: "/".into(),
            not_found_path: "/404".into(),
            redirect_param: "redirect".into(),
            default_title: "文化遗产后台管理系统".into(),
            auth_failure_message: "认证失败，请重新登录".into(),
            notice_duration: Notice::DEFAULT_DURATION,
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The guard's verdict for one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Go to `to`; `title` is the page title to show.
    Proceed { to: Location, title: String },
    /// Go to `to` instead.
    Redirect { to: Location },
}

impl Navigation {
    /// Where the operator ends up after this decision.
    pub fn location(&self) -> &Location {
        match self {
            Self::Proceed { to, .. } | Self::Redirect { to } => to,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}

// ---------------------------------------------------------------------------
// NavigationGuard
// ---------------------------------------------------------------------------

/// Runs before every route transition.
pub struct NavigationGuard<A, N> {
    session: Arc<SessionStore<A>>,
    notifier: Arc<N>,
    routes: Arc<RouteTable>,
    config: GuardConfig,
}

impl<A: AuthService, N: Notifier> NavigationGuard<A, N> {
    pub fn new(
        session: Arc<SessionStore<A>>,
        notifier: Arc<N>,
        routes: Arc<RouteTable>,
        config: GuardConfig,
    ) -> Self {
        Self {
            session,
            notifier,
            routes,
            config,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    pub fn session(&self) -> &Arc<SessionStore<A>> {
        &self.session
    }

    /// Decides what happens when navigating from `from` to `to`.
    pub async fn before_each(&self, to: &Location, from: &Location) -> Navigation {
        let phase = self.session.phase();
        let to_login = to.path() == self.config.login_path;
        tracing::debug!(from = %from, to = %to, ?phase, "navigation requested");

        let decision = match (phase, to_login) {
            (SessionPhase::NoToken, true) => self.proceed(to),
            (SessionPhase::NoToken, false) => self.to_login(to),
            (_, true) => Navigation::Redirect {
                to: Location::new(self.config.home_path.clone()),
            },
            (SessionPhase::TokenWithIdentity, false) => self.proceed(to),
            (SessionPhase::TokenNoIdentity, false) => {
                match self.session.fetch_identity().await {
                    Ok(_) => self.proceed(to),
                    Err(e) => {
                        tracing::warn!(to = %to, error = %e, "identity fetch failed, back to login");
                        self.session.invalidate();
                        self.notifier.notify(
                            Notice::error(failure_text(&e, &self.config.auth_failure_message))
                                .with_duration(self.config.notice_duration),
                        );
                        self.to_login(to)
                    }
                }
            }
        };

        tracing::debug!(to = %to, decision = %decision.location(), redirect = decision.is_redirect(), "navigation decided");
        decision
    }

    /// Where to go after a successful login, read from the login
    /// location's return-path parameter.
    ///
    /// Only absolute in-app paths are honoured, and never the login page
    /// itself. Anything else falls back to home.
    pub fn return_target(&self, login_location: &Location) -> Location {
        let home = || Location::new(self.config.home_path.clone());
        let Some(raw) = login_location.query_value(&self.config.redirect_param) else {
            return home();
        };
        if !raw.starts_with('/') || raw.starts_with("//") {
            return home();
        }
        match Location::parse(raw) {
            Ok(target) if target.path() != self.config.login_path => target,
            _ => home(),
        }
    }

    fn proceed(&self, to: &Location) -> Navigation {
        let title = self
            .routes
            .title_for(to.path())
            .unwrap_or_else(|| self.config.default_title.clone());
        Navigation::Proceed {
            to: to.clone(),
            title,
        }
    }

    fn to_login(&self, to: &Location) -> Navigation {
        Navigation::Redirect {
            to: Location::new(self.config.login_path.clone())
                .with_query(self.config.redirect_param.clone(), to.path()),
        }
    }
}

// The fetch error's own text, or `fallback` when it has none.
fn failure_text(error: &dyn fmt::Display, fallback: &str) -> String {
    let text = error.to_string();
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
