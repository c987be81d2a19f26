//! # Adminward
//!
//! Session, request pipeline and route guard core for a heritage
//! administration console.
//!
//! Adminward owns the parts of an admin console that decide who the
//! operator is and whether a call or a page is allowed: the credential
//! store, the shared session, the HTTP client pipeline that attaches the
//! token and reacts to `401`, and the navigation guard in front of every
//! route. Rendering is left to the host.
//!
//! ```text
//! ┌──────────── Console ─────────────┐
//! │ Router ─→ NavigationGuard        │
//! │              │                   │
//! │              ▼                   │
//! │ SessionStore ─→ AuthApi          │
//! │      │             │             │
//! │      ▼             ▼             │
//! │ SessionContext ←─ ApiClient ─→ HttpTransport
//! │      │                           │
//! │      ▼                           │
//! │ CredentialStore                  │
//! └──────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adminward::prelude::*;
//!
//! # async fn run() -> Result<(), AdminwardError> {
//! adminward::telemetry::init();
//!
//! let console = ConsoleBuilder::new()
//!     .config(ConsoleConfig::from_env()?)
//!     .build()?;
//!
//! console.login("alice", "secret").await?;
//! match console.navigate("/heritage/list", &Location::new("/")).await? {
//!     Navigation::Proceed { title, .. } => println!("showing {title}"),
//!     Navigation::Redirect { to } => println!("sent to {to}"),
//! }
//! # Ok(())
//! # }
//! ```

mod auth_api;
mod client;
mod config;
mod console;
mod error;
mod routes;
pub mod telemetry;

pub use auth_api::{AuthApi, LOGIN_PATH, PROFILE_PATH};
pub use client::{ApiClient, PipelineConfig, SUCCESS_STATUSES};
pub use config::{ConsoleConfig, DEFAULT_BASE_URL, ENV_BASE_API, ENV_STORAGE_DIR, ENV_TIMEOUT_MS};
pub use console::{Console, ConsoleBuilder, DefaultConsole};
pub use error::{AdminwardError, ApiError, ConfigError};
pub use routes::console_routes;

/// Convenient re-exports for hosts embedding the console core.
pub mod prelude {
    pub use crate::{
        AdminwardError, ApiClient, ApiError, Console, ConsoleBuilder, ConsoleConfig,
        DefaultConsole,
    };
    pub use adminward_protocol::{Identity, Role, Token};
    pub use adminward_router::{Location, MenuEntry, Navigation};
    pub use adminward_session::{
        Capability, InvalidationCause, Notice, Notifier, Prompt, SessionInvalidated,
        SessionPhase,
    };
    pub use adminward_transport::{HttpRequest, HttpResponse, HttpTransport};
}
