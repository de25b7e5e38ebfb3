//! Role membership interface.

use perpliq_core::{Address, Role};

/// Read-only view of `(account, role)` assignments.
pub trait RoleStore: Send + Sync {
    fn has_role(&self, account: &Address, role: &Role) -> bool;
}
