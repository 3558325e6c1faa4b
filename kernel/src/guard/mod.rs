// Mutation Guard
//
// The ledger asks a guard whether a caller may mutate it before any
// write. Role storage and assignment belong to the host.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of whoever is calling a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller(pub Uuid);

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Mutating operations a guard can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Append,
    BulkInject,
    OverwriteRecent,
    OverwriteById,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Append => "append",
            Operation::BulkInject => "bulk-inject",
            Operation::OverwriteRecent => "overwrite-recent",
            Operation::OverwriteById => "overwrite-by-id",
        };
        f.write_str(name)
    }
}

/// Answers whether a caller may perform a mutating operation.
///
/// Implementations must be pure predicates: the ledger may call them
/// any number of times and relies on no side effects.
pub trait AuthorizationGuard {
    fn is_authorized(&self, caller: &Caller, operation: Operation) -> bool;
}

impl<F> AuthorizationGuard for F
where
    F: Fn(&Caller, Operation) -> bool,
{
    fn is_authorized(&self, caller: &Caller, operation: Operation) -> bool {
        self(caller, operation)
    }
}

/// Owner-or-manager gating.
///
/// Either role may perform every mutation; anyone else is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manageable {
    owner: Caller,
    manager: Option<Caller>,
}

impl Manageable {
    pub fn new(owner: Caller) -> Self {
        Self {
            owner,
            manager: None,
        }
    }

    pub fn owner(&self) -> &Caller {
        &self.owner
    }

    pub fn manager(&self) -> Option<&Caller> {
        self.manager.as_ref()
    }

    /// Replace the manager. `None` removes it.
    pub fn set_manager(&mut self, manager: Option<Caller>) {
        self.manager = manager;
    }
}

impl AuthorizationGuard for Manageable {
    fn is_authorized(&self, caller: &Caller, _operation: Operation) -> bool {
        *caller == self.owner || self.manager.as_ref() == Some(caller)
    }
}
