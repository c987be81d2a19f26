//! `Console` builder and wiring.
//!
//! This is the application root for the console core. It creates the one
//! [`SessionContext`] and hands it to every layer that needs it:
//! credential store → session context → client pipeline → auth API →
//! session store → router.

use std::sync::Arc;

use adminward_router::{Location, MenuEntry, Navigation, RouteTable, Router};
use adminward_session::{
    Capability, CredentialStore, FileCredentialStore, LogNotifier, MemoryCredentialStore,
    Notifier, PermissionTable, SessionContext, SessionInvalidated, SessionState, SessionStore,
};
use adminward_transport::{HttpTransport, ReqwestTransport};
use tokio::sync::{broadcast, watch};

use crate::{AdminwardError, ApiClient, AuthApi, ConsoleConfig, PipelineConfig, console_routes};

/// A console wired to the real HTTP stack and a logging notifier.
pub type DefaultConsole = Console<ReqwestTransport, LogNotifier>;

/// Builder for configuring and wiring a [`Console`].
///
/// # Example
///
/// ```rust,no_run
/// use adminward::prelude::*;
///
/// # async fn run() -> Result<(), AdminwardError> {
/// let console = ConsoleBuilder::new()
///     .config(ConsoleConfig::from_env()?)
///     .build()?;
///
/// console.login("alice", "secret").await?;
/// let nav = console.navigate("/dashboard", &Location::new("/login")).await?;
/// # let _ = nav;
/// # Ok(())
/// # }
/// ```
pub struct ConsoleBuilder {
    config: ConsoleConfig,
    routes: Option<RouteTable>,
    permissions: PermissionTable,
    credentials: Option<Arc<dyn CredentialStore>>,
    pipeline: Option<PipelineConfig>,
}

impl ConsoleBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ConsoleConfig::default(),
            routes: None,
            permissions: PermissionTable::default(),
            credentials: None,
            pipeline: None,
        }
    }

    pub fn config(mut self, config: ConsoleConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the built-in route tree.
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn permissions(mut self, permissions: PermissionTable) -> Self {
        self.permissions = permissions;
        self
    }

    /// Uses `store` instead of the one `storage_dir` would select.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Overrides the pipeline texts derived from the config.
    pub fn pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Wires the console over the `reqwest` transport and [`LogNotifier`].
    ///
    /// # Errors
    /// - [`ConfigError::InvalidValue`](crate::ConfigError) if `base_url`
    ///   is not an absolute `http(s)://` URL
    /// - [`TransportError`](adminward_transport::TransportError) if the
    ///   HTTP client cannot be built
    pub fn build(self) -> Result<DefaultConsole, AdminwardError> {
        self.config.validate()?;
        let transport =
            ReqwestTransport::with_timeout(self.config.base_url.clone(), self.config.timeout())?;
        Ok(self.build_with(transport, LogNotifier::new()))
    }

    /// Wires the console over any transport and notifier.
    pub fn build_with<T: HttpTransport, N: Notifier>(self, transport: T, notifier: N) -> Console<T, N> {
        let credentials: Arc<dyn CredentialStore> = match (self.credentials, &self.config.storage_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FileCredentialStore::new(dir)),
            (None, None) => Arc::new(MemoryCredentialStore::new()),
        };
        let context = Arc::new(SessionContext::restore(credentials));
        let notifier = Arc::new(notifier);

        let pipeline = self
            .pipeline
            .unwrap_or_else(|| self.config.pipeline_config());
        let client = ApiClient::new(transport, Arc::clone(&context), Arc::clone(&notifier), pipeline);

        let session = Arc::new(
            SessionStore::new(Arc::clone(&context), AuthApi::new(client.clone()))
                .with_permissions(self.permissions),
        );
        let routes = Arc::new(self.routes.unwrap_or_else(console_routes));
        let router = Router::new(
            Arc::clone(&session),
            notifier,
            routes,
            self.config.guard_config(),
        );

        tracing::info!(
            base_url = %self.config.base_url,
            restored = context.token().is_some(),
            "console ready"
        );

        Console {
            config: self.config,
            context,
            client,
            session,
            router,
        }
    }
}

impl Default for ConsoleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The wired console core.
pub struct Console<T, N> {
    config: ConsoleConfig,
    context: Arc<SessionContext>,
    client: ApiClient<T, N>,
    session: Arc<SessionStore<AuthApi<T, N>>>,
    router: Router<AuthApi<T, N>, N>,
}

impl Console<ReqwestTransport, LogNotifier> {
    /// Creates a new builder.
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::new()
    }
}

impl<T: HttpTransport, N: Notifier> Console<T, N> {
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// The pipeline resource-API collaborators should call through.
    pub fn client(&self) -> &ApiClient<T, N> {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionStore<AuthApi<T, N>>> {
        &self.session
    }

    pub fn router(&self) -> &Router<AuthApi<T, N>, N> {
        &self.router
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), AdminwardError> {
        Ok(self.session.login(username, password).await?)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Runs a route transition through the router and guard.
    pub async fn navigate(&self, target: &str, from: &Location) -> Result<Navigation, AdminwardError> {
        Ok(self.router.navigate(target, from).await?)
    }

    /// Where to go once logged in, given the login page's location.
    pub fn return_target(&self, login_location: &Location) -> Location {
        self.router.guard().return_target(login_location)
    }

    pub fn has_permission(&self, capability: &Capability) -> bool {
        self.session.has_permission(capability)
    }

    /// The visible route tree.
    pub fn menu(&self) -> Vec<MenuEntry> {
        self.router.routes().menu()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.context.subscribe()
    }

    pub fn subscribe_invalidations(&self) -> broadcast::Receiver<SessionInvalidated> {
        self.context.subscribe_invalidations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, ENV_BASE_API};

    #[test]
    fn test_build_empty_base_url_is_config_error() {
        let config = ConsoleConfig {
            base_url: String::new(),
            ..ConsoleConfig::default()
        };

        let err = ConsoleBuilder::new().config(config).build().err().unwrap();

        assert!(matches!(
            err,
            AdminwardError::Config(ConfigError::InvalidValue { ref key, .. }) if key == ENV_BASE_API
        ));
    }

    #[tokio::test]
    async fn test_build_default_config_targets_backend() {
        let console = ConsoleBuilder::new().build().unwrap();

        assert_eq!(console.config().base_url, crate::DEFAULT_BASE_URL);
        assert_eq!(console.client().transport().base_url(), crate::DEFAULT_BASE_URL);
    }
}
