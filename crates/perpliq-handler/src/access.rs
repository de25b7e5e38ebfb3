//! Role check run before any state is touched.

use perpliq_core::{Address, Role};
use perpliq_venue::RoleStore;
use tracing::{debug, warn};

use crate::error::{HandlerResult, LiquidationError};

pub struct AccessPolicyGate;

impl AccessPolicyGate {
    /// Require `caller` to hold `role`. Read-only.
    pub fn authorize(role_store: &dyn RoleStore, caller: &Address, role: &Role) -> HandlerResult<()> {
        if role_store.has_role(caller, role) {
            debug!(%caller, role = role.name(), "Caller authorized");
            Ok(())
        } else {
            warn!(%caller, role = role.name(), "Caller rejected: missing role");
            Err(LiquidationError::Unauthorized {
                account: *caller,
                role: *role,
            })
        }
    }
}
