//! # Governance Roles
//!
//! The closed set of roles that authorize dispatcher operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A governance role scoping dispatcher operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full governance: roles, freeze, limits.
    Admin,
    /// May commit pending roots.
    Commit,
    /// May apply route batches and activate pending roots.
    Apply,
    /// May pause and unpause dispatch.
    Emergency,
    /// Reserved for orchestrated deployment executors.
    Executor,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Commit,
        Role::Apply,
        Role::Emergency,
        Role::Executor,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Commit => "COMMIT",
            Role::Apply => "APPLY",
            Role::Emergency => "EMERGENCY",
            Role::Executor => "EXECUTOR",
        };
        write!(f, "{name}")
    }
}
