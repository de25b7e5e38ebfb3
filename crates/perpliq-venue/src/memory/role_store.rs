//! In-memory role assignments.

use dashmap::DashSet;
use perpliq_core::{Address, Role, B256};
use tracing::info;

use crate::role_store::RoleStore;

#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    members: DashSet<(Address, B256)>,
}

impl InMemoryRoleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_role(&self, account: Address, role: &Role) {
        if self.members.insert((account, role.id())) {
            info!(%account, role = role.name(), "Role granted");
        }
    }

    pub fn revoke_role(&self, account: &Address, role: &Role) {
        if self.members.remove(&(*account, role.id())).is_some() {
            info!(%account, role = role.name(), "Role revoked");
        }
    }
}

impl RoleStore for InMemoryRoleStore {
    fn has_role(&self, account: &Address, role: &Role) -> bool {
        self.members.contains(&(*account, role.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_and_revoke() {
        let store = InMemoryRoleStore::new();
        let keeper = Address::repeat_byte(0x4b);
        let role = Role::liquidation_keeper();

        assert!(!store.has_role(&keeper, &role));
        store.grant_role(keeper, &role);
        assert!(store.has_role(&keeper, &role));
        assert!(!store.has_role(&keeper, &Role::adl_keeper()));

        store.revoke_role(&keeper, &role);
        assert!(!store.has_role(&keeper, &role));
    }
}
