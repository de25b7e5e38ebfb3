//! Journaled in-memory data store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::RwLock;
use perpliq_core::{keys, Address, Order, OrderKey, OrderStatus, Position, B256};
use tracing::{debug, trace, warn};

use crate::data_store::{Checkpoint, DataStore};
use crate::error::{VenueError, VenueResult};

/// Previous value of a slot, restored on revert.
#[derive(Debug, Clone)]
enum UndoEntry {
    Nonce(u64),
    Bool(B256, Option<bool>),
    Position(B256, Option<Position>),
    Order(OrderKey, Option<Order>),
}

#[derive(Debug, Default)]
struct StoreState {
    nonce: u64,
    bools: HashMap<B256, bool>,
    positions: HashMap<B256, Position>,
    orders: HashMap<OrderKey, Order>,
    /// One undo frame per open checkpoint, innermost last.
    frames: Vec<Vec<UndoEntry>>,
    /// Thread holding the open checkpoints.
    owner: Option<ThreadId>,
}

impl StoreState {
    /// Journal writes made by the checkpoint owner into the innermost frame.
    fn record(&mut self, entry: UndoEntry) {
        if self.owner != Some(thread::current().id()) {
            if self.owner.is_some() {
                trace!("Write from outside the checkpoint owner not journaled");
            }
            return;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.push(entry);
        }
    }

    fn undo(&mut self, entry: UndoEntry) {
        match entry {
            UndoEntry::Nonce(prev) => self.nonce = prev,
            UndoEntry::Bool(key, Some(prev)) => {
                self.bools.insert(key, prev);
            }
            UndoEntry::Bool(key, None) => {
                self.bools.remove(&key);
            }
            UndoEntry::Position(key, Some(prev)) => {
                self.positions.insert(key, prev);
            }
            UndoEntry::Position(key, None) => {
                self.positions.remove(&key);
            }
            UndoEntry::Order(key, Some(prev)) => {
                self.orders.insert(key, prev);
            }
            UndoEntry::Order(key, None) => {
                self.orders.remove(&key);
            }
        }
    }

    /// Pop the innermost frame, which must be `checkpoint`'s.
    fn close(&mut self, checkpoint: Checkpoint) -> VenueResult<Vec<UndoEntry>> {
        let open = self.frames.len();
        if self.owner != Some(thread::current().id()) || checkpoint.0 + 1 != open {
            return Err(VenueError::CheckpointOutOfOrder {
                requested: checkpoint.0,
                open,
            });
        }
        let frame = self.frames.pop().unwrap_or_default();
        if self.frames.is_empty() {
            self.owner = None;
        }
        Ok(frame)
    }
}

/// In-memory [`DataStore`] with an undo journal.
#[derive(Debug)]
pub struct InMemoryDataStore {
    address: Address,
    current_block: AtomicU64,
    state: RwLock<StoreState>,
}

impl InMemoryDataStore {
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            current_block: AtomicU64::new(0),
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn set_current_block(&self, block: u64) {
        self.current_block.store(block, Ordering::Release);
    }

    /// Current nonce (number of orders ever created).
    #[must_use]
    pub fn nonce(&self) -> u64 {
        self.state.read().nonce
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.state.read().orders.len()
    }

    /// All orders, in no particular order.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.state.read().orders.values().cloned().collect()
    }

    #[must_use]
    pub fn position_count(&self) -> usize {
        self.state.read().positions.len()
    }

    /// Number of undo entries currently held.
    #[must_use]
    pub fn journal_len(&self) -> usize {
        self.state.read().frames.iter().map(Vec::len).sum()
    }

    /// Number of checkpoints not yet committed or reverted.
    #[must_use]
    pub fn open_checkpoints(&self) -> usize {
        self.state.read().frames.len()
    }
}

impl DataStore for InMemoryDataStore {
    fn address(&self) -> Address {
        self.address
    }

    fn current_block(&self) -> u64 {
        self.current_block.load(Ordering::Acquire)
    }

    fn increment_nonce(&self) -> u64 {
        let mut state = self.state.write();
        let prev = state.nonce;
        state.record(UndoEntry::Nonce(prev));
        state.nonce = prev + 1;
        trace!(nonce = state.nonce, key = %keys::nonce_key(), "Nonce incremented");
        state.nonce
    }

    fn get_bool(&self, key: &B256) -> bool {
        self.state.read().bools.get(key).copied().unwrap_or(false)
    }

    fn set_bool(&self, key: B256, value: bool) {
        let mut state = self.state.write();
        let prev = state.bools.insert(key, value);
        state.record(UndoEntry::Bool(key, prev));
    }

    fn get_position(&self, key: &B256) -> Option<Position> {
        self.state.read().positions.get(key).cloned()
    }

    fn set_position(&self, position: Position) {
        let key = position.key();
        let mut state = self.state.write();
        let prev = state.positions.insert(key, position);
        state.record(UndoEntry::Position(key, prev));
    }

    fn remove_position(&self, key: &B256) {
        let mut state = self.state.write();
        if let Some(prev) = state.positions.remove(key) {
            state.record(UndoEntry::Position(*key, Some(prev)));
        }
    }

    fn get_order(&self, key: &OrderKey) -> Option<Order> {
        self.state.read().orders.get(key).cloned()
    }

    fn insert_order(&self, order: Order) -> VenueResult<()> {
        let key = order.key;
        let mut state = self.state.write();
        if state.orders.contains_key(&key) {
            return Err(VenueError::OrderAlreadyExists(key));
        }
        state.orders.insert(key, order);
        state.record(UndoEntry::Order(key, None));
        Ok(())
    }

    fn set_order_status(&self, key: &OrderKey, status: OrderStatus) -> VenueResult<()> {
        let mut state = self.state.write();
        let prev = state
            .orders
            .get(key)
            .cloned()
            .ok_or(VenueError::OrderNotFound(*key))?;
        if let Some(order) = state.orders.get_mut(key) {
            order.status = status;
        }
        state.record(UndoEntry::Order(*key, Some(prev)));
        Ok(())
    }

    fn checkpoint(&self) -> VenueResult<Checkpoint> {
        let mut state = self.state.write();
        let me = thread::current().id();
        match state.owner {
            Some(owner) if owner != me => {
                warn!(open = state.frames.len(), "Checkpoint refused: held by another thread");
                return Err(VenueError::CheckpointBusy);
            }
            _ => state.owner = Some(me),
        }
        state.frames.push(Vec::new());
        Ok(Checkpoint(state.frames.len() - 1))
    }

    fn revert_to(&self, checkpoint: Checkpoint) -> VenueResult<usize> {
        let mut state = self.state.write();
        let frame = state.close(checkpoint)?;
        let undone = frame.len();
        for entry in frame.into_iter().rev() {
            state.undo(entry);
        }
        debug!(undone, depth = checkpoint.0, "Data store reverted to checkpoint");
        Ok(undone)
    }

    fn commit(&self, checkpoint: Checkpoint) -> VenueResult<()> {
        let mut state = self.state.write();
        let frame = state.close(checkpoint)?;
        // An inner commit stays revertible through its parent.
        if let Some(parent) = state.frames.last_mut() {
            parent.extend(frame);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpliq_core::{PositionDescriptor, Usd};
    use rust_decimal_macros::dec;

    fn store() -> InMemoryDataStore {
        InMemoryDataStore::new(Address::repeat_byte(0xd5))
    }

    fn position(size: rust_decimal::Decimal) -> Position {
        let descriptor = PositionDescriptor::new(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            Address::repeat_byte(3),
            true,
        );
        let mut position = Position::empty(&descriptor);
        position.size_in_usd = Usd::new(size);
        position
    }

    #[test]
    fn test_nonce_increments() {
        let store = store();
        assert_eq!(store.increment_nonce(), 1);
        assert_eq!(store.increment_nonce(), 2);
        assert_eq!(store.nonce(), 2);
    }

    #[test]
    fn test_revert_restores_all_slots() {
        let store = store();
        let key = B256::repeat_byte(9);
        store.set_bool(key, true);
        store.set_position(position(dec!(1000)));
        let position_key = position(dec!(0)).key();

        let cp = store.checkpoint().unwrap();
        store.increment_nonce();
        store.set_bool(key, false);
        store.remove_position(&position_key);
        assert_eq!(store.revert_to(cp).unwrap(), 3);

        assert_eq!(store.nonce(), 0);
        assert!(store.get_bool(&key));
        assert_eq!(
            store.get_position(&position_key).unwrap().size_in_usd,
            Usd::new(dec!(1000))
        );
        assert_eq!(store.journal_len(), 0);
        assert_eq!(store.open_checkpoints(), 0);
    }

    #[test]
    fn test_commit_keeps_writes() {
        let store = store();
        let cp = store.checkpoint().unwrap();
        store.increment_nonce();
        store.set_position(position(dec!(5)));
        store.commit(cp).unwrap();

        assert_eq!(store.nonce(), 1);
        assert_eq!(store.position_count(), 1);
        assert_eq!(store.journal_len(), 0);
        assert_eq!(store.open_checkpoints(), 0);
    }

    #[test]
    fn test_writes_outside_checkpoint_not_journaled() {
        let store = store();
        store.set_bool(B256::repeat_byte(1), true);
        assert_eq!(store.journal_len(), 0);
    }

    #[test]
    fn test_nested_checkpoint_revert_inner_only() {
        let store = store();
        let outer = store.checkpoint().unwrap();
        store.increment_nonce();
        let inner = store.checkpoint().unwrap();
        store.increment_nonce();
        store.revert_to(inner).unwrap();

        assert_eq!(store.nonce(), 1);
        store.revert_to(outer).unwrap();
        assert_eq!(store.nonce(), 0);
    }

    #[test]
    fn test_inner_commit_folds_into_parent() {
        let store = store();
        let outer = store.checkpoint().unwrap();
        let inner = store.checkpoint().unwrap();
        store.increment_nonce();
        store.commit(inner).unwrap();
        assert_eq!(store.journal_len(), 1);

        store.revert_to(outer).unwrap();
        assert_eq!(store.nonce(), 0);
    }

    #[test]
    fn test_outer_resolved_before_inner_refused() {
        let store = store();
        let outer = store.checkpoint().unwrap();
        let inner = store.checkpoint().unwrap();

        assert_eq!(
            store.commit(outer),
            Err(VenueError::CheckpointOutOfOrder { requested: 0, open: 2 })
        );
        store.commit(inner).unwrap();
        store.commit(outer).unwrap();
        assert_eq!(store.open_checkpoints(), 0);
    }

    #[test]
    fn test_checkpoint_from_other_thread_refused() {
        let store = std::sync::Arc::new(store());
        let cp = store.checkpoint().unwrap();
        store.increment_nonce();

        let other = std::sync::Arc::clone(&store);
        let (refused, other_nonce) = std::thread::spawn(move || {
            let refused = other.checkpoint();
            let nonce = other.increment_nonce();
            (refused, nonce)
        })
        .join()
        .unwrap();
        assert_eq!(refused, Err(VenueError::CheckpointBusy));
        assert_eq!(other_nonce, 2);

        // The other thread's write is not part of this checkpoint.
        assert_eq!(store.revert_to(cp).unwrap(), 1);
        assert_eq!(store.open_checkpoints(), 0);

        let other = std::sync::Arc::clone(&store);
        let accepted = std::thread::spawn(move || {
            other
                .checkpoint()
                .and_then(|cp| other.commit(cp))
                .is_ok()
        })
        .join()
        .unwrap();
        assert!(accepted);
    }
}
