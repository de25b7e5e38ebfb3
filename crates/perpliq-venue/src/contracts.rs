//! Bundle of collaborator handles.

use std::sync::Arc;

use crate::{DataStore, EventEmitter, Oracle, OrderVault, ReferralStorage, RoleStore, SwapHandler};

/// Shared handles to every venue collaborator.
///
/// Fixed at handler construction. Cloning is cheap (reference counts only).
#[derive(Clone)]
pub struct Contracts {
    pub data_store: Arc<dyn DataStore>,
    pub role_store: Arc<dyn RoleStore>,
    pub event_emitter: Arc<dyn EventEmitter>,
    pub order_vault: Arc<dyn OrderVault>,
    pub oracle: Arc<dyn Oracle>,
    pub swap_handler: Arc<dyn SwapHandler>,
    pub referral_storage: Arc<dyn ReferralStorage>,
}

impl Contracts {
    /// Same handles, with events routed to `event_emitter` instead.
    pub fn with_event_emitter(&self, event_emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            event_emitter,
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for Contracts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contracts")
            .field("data_store", &self.data_store.address())
            .finish_non_exhaustive()
    }
}
