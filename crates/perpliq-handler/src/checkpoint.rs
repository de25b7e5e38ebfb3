//! Data-store checkpoint scoped to one handler call.
//!
//! [`StoreCheckpoint`] reverts the store when dropped unless it was
//! committed, so an unwinding strategy leaves neither writes nor an open
//! checkpoint behind.

use perpliq_venue::{Checkpoint, DataStore};
use tracing::{debug, error};

use crate::error::HandlerResult;

#[must_use = "the store is reverted as soon as the checkpoint is dropped"]
pub struct StoreCheckpoint<'a> {
    data_store: &'a dyn DataStore,
    checkpoint: Option<Checkpoint>,
}

impl<'a> StoreCheckpoint<'a> {
    /// # Errors
    /// `Venue(CheckpointBusy)` if another caller holds a checkpoint on the store.
    pub fn open(data_store: &'a dyn DataStore) -> HandlerResult<Self> {
        let checkpoint = data_store.checkpoint()?;
        Ok(Self {
            data_store,
            checkpoint: Some(checkpoint),
        })
    }

    /// Keep every write made since [`open`](Self::open). On failure the
    /// checkpoint stays open and is reverted on drop.
    pub fn commit(&mut self) -> HandlerResult<()> {
        if let Some(checkpoint) = self.checkpoint {
            self.data_store.commit(checkpoint)?;
            self.checkpoint = None;
        }
        Ok(())
    }

    /// Undo every write made since [`open`](Self::open). Returns the number
    /// of writes undone.
    pub fn revert(&mut self) -> usize {
        let Some(checkpoint) = self.checkpoint.take() else {
            return 0;
        };
        match self.data_store.revert_to(checkpoint) {
            Ok(undone) => undone,
            Err(e) => {
                error!(error = %e, "Data store revert failed");
                0
            }
        }
    }
}

impl std::fmt::Debug for StoreCheckpoint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCheckpoint")
            .field("store", &self.data_store.address())
            .field("checkpoint", &self.checkpoint)
            .finish()
    }
}

impl Drop for StoreCheckpoint<'_> {
    fn drop(&mut self) {
        if self.checkpoint.is_some() {
            let undone = self.revert();
            debug!(undone, "Unresolved checkpoint reverted on drop");
        }
    }
}
