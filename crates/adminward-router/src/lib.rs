//! Routing and navigation guarding for Adminward.
//!
//! Every route change runs through the same pipeline:
//!
//! ```text
//! "/heritage" ──parse──→ Location ──route redirects──→ /heritage/list
//!                                                         │
//!                                  NavigationGuard ←──────┘
//!                                         │
//!                  Proceed { to, title }  or  Redirect { to: /login?redirect=... }
//! ```
//!
//! # Key types
//!
//! - [`RouteDescriptor`] / [`RouteTable`] — the declared route tree
//! - [`Location`] — a path plus query, parsed and formatted
//! - [`NavigationGuard`] — the per-transition decision state machine
//! - [`Router`] — route-level redirects and not-found, then the guard

mod error;
mod guard;
mod location;
mod route;
mod router;

pub use error::RouterError;
pub use guard::{GuardConfig, Navigation, NavigationGuard};
pub use location::Location;
pub use route::{MenuEntry, ResolvedRoute, RouteDescriptor, RouteTable};
pub use router::{MAX_REDIRECTS, Router};
