//! The router: route-level redirects and not-found handling, then the
//! guard.

use std::sync::Arc;

use adminward_session::{AuthService, Notifier, SessionStore};

use crate::{GuardConfig, Location, Navigation, NavigationGuard, RouteTable, RouterError};

/// How many route-level redirects one navigation may follow.
pub const MAX_REDIRECTS: usize = 8;

/// Resolves targets against the route table and runs the guard on the
/// result.
pub struct Router<A, N> {
    guard: NavigationGuard<A, N>,
}

impl<A: AuthService, N: Notifier> Router<A, N> {
    pub fn new(
        session: Arc<SessionStore<A>>,
        notifier: Arc<N>,
        routes: Arc<RouteTable>,
        config: GuardConfig,
    ) -> Self {
        Self {
            guard: NavigationGuard::new(session, notifier, routes, config),
        }
    }

    pub fn guard(&self) -> &NavigationGuard<A, N> {
        &self.guard
    }

    pub fn routes(&self) -> &RouteTable {
        self.guard.routes()
    }

    /// Navigates to `target` (e.g. `"/heritage/edit/7?tab=media"`).
    ///
    /// Route-level redirects are followed first, so the guard always sees
    /// the final target. The guard's own redirect is returned, not
    /// followed; the host navigates again if it wants to.
    ///
    /// # Errors
    /// - [`RouterError::InvalidPath`] — `target` is not an in-app path
    /// - [`RouterError::RedirectLoop`] — redirects never settled
    /// - [`RouterError::NoMatch`] — nothing matched, not even not-found
    pub async fn navigate(&self, target: &str, from: &Location) -> Result<Navigation, RouterError> {
        let target = self.resolve(Location::parse(target)?)?;
        Ok(self.guard.before_each(&target, from).await)
    }

    /// Follows route-level redirects from `target` until a route without
    /// one matches. Unmatched paths go to the not-found path.
    pub fn resolve(&self, target: Location) -> Result<Location, RouterError> {
        let origin = target.path().to_string();
        let not_found = &self.guard.config().not_found_path;
        let mut current = target;

        for _ in 0..=MAX_REDIRECTS {
            let next = match self.routes().resolve(current.path()) {
                Some(route) => match route.redirect {
                    Some(redirect) => redirect,
                    None => return Ok(current),
                },
                None if current.path() == not_found.as_str() => {
                    return Err(RouterError::NoMatch(origin));
                }
                None => not_found.clone(),
            };

            tracing::debug!(from = %current.path(), to = %next, "route redirect");
            let mut redirected = Location::parse(&next)?;
            // A plain-path redirect keeps the original query.
            if redirected.query().is_empty() {
                redirected = redirected.with_query_pairs(current.query().to_vec());
            }
            current = redirected;
        }

        tracing::warn!(target = %origin, "route redirects did not settle");
        Err(RouterError::RedirectLoop(origin))
    }
}
