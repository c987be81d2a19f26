//! Capabilities and the role → capability table.
//!
//! Permission checks are pure: no I/O, no session access. Callers hand in
//! whatever identity they currently trust (usually the session's cached
//! one) and get a yes/no back.
//!
//! The evaluation order is fixed:
//!
//! 1. no identity → deny
//! 2. role is `super_admin` → allow, even for capabilities nobody
//!    registered
//! 3. otherwise look the role up in the table; an unknown role denies
//!    everything

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use adminward_protocol::{Identity, Role};

use crate::SessionError;

/// A named permission gate checked before allowing an action or view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability(Cow<'static, str>);

impl Capability {
    pub const USER_MANAGE: Capability = Capability(Cow::Borrowed("user_manage"));
    pub const DATA_MANAGE: Capability = Capability(Cow::Borrowed("data_manage"));
    pub const BACKUP_MANAGE: Capability = Capability(Cow::Borrowed("backup_manage"));
    pub const LOG_VIEW: Capability = Capability(Cow::Borrowed("log_view"));

    /// Every capability the console knows about.
    pub const ALL: [Capability; 4] = [
        Self::USER_MANAGE,
        Self::DATA_MANAGE,
        Self::BACKUP_MANAGE,
        Self::LOG_VIEW,
    ];

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps role names to the capabilities they grant.
///
/// `super_admin` never needs an entry: it is allowed everything before the
/// table is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    grants: HashMap<Role, HashSet<Capability>>,
}

impl PermissionTable {
    /// A table with no roles. Only `super_admin` is allowed anything.
    pub fn empty() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    /// Adds `capabilities` to `role`, keeping whatever it already had.
    pub fn grant(
        mut self,
        role: Role,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        self.grants.entry(role).or_default().extend(capabilities);
        self
    }

    /// Returns whether `identity` holds `capability`.
    pub fn has_permission(
        &self,
        identity: Option<&Identity>,
        capability: &Capability,
    ) -> bool {
        let Some(identity) = identity else {
            return false;
        };
        if identity.role.is_super_admin() {
            return true;
        }
        self.grants
            .get(&identity.role)
            .is_some_and(|caps| caps.contains(capability))
    }

    /// Like [`has_permission`](Self::has_permission), but a deny becomes
    /// [`SessionError::PermissionDenied`].
    pub fn require(
        &self,
        identity: Option<&Identity>,
        capability: &Capability,
    ) -> Result<(), SessionError> {
        if self.has_permission(identity, capability) {
            Ok(())
        } else {
            tracing::debug!(
                role = identity.map(|i| i.role.as_str()),
                %capability,
                "permission denied"
            );
            Err(SessionError::PermissionDenied(capability.clone()))
        }
    }

    /// The capabilities the table lists for `role`. Empty for unknown
    /// roles and for `super_admin`, which bypasses the table.
    pub fn capabilities(&self, role: &Role) -> impl Iterator<Item = &Capability> {
        self.grants.get(role).into_iter().flatten()
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::empty()
            .grant(Role::ADMIN, Capability::ALL)
            .grant(Role::OPERATOR, [Capability::DATA_MANAGE, Capability::LOG_VIEW])
    }
}

static DEFAULT_TABLE: LazyLock<PermissionTable> = LazyLock::new(PermissionTable::default);

/// Checks `capability` against the default role table.
pub fn has_permission(identity: Option<&Identity>, capability: &Capability) -> bool {
    DEFAULT_TABLE.has_permission(identity, capability)
}
