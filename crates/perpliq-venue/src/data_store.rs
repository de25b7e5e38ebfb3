//! Data store interface.

use perpliq_core::{Address, Order, OrderKey, OrderStatus, Position, B256};

use crate::error::VenueResult;

/// Opaque marker returned by [`DataStore::checkpoint`]: its nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(pub(crate) usize);

/// Persistent venue state.
///
/// All writes made after a [`checkpoint`](DataStore::checkpoint) can be
/// undone with [`revert_to`](DataStore::revert_to) or made permanent with
/// [`commit`](DataStore::commit). Every checkpoint must be resolved by
/// exactly one of the two, innermost first.
///
/// A checkpoint belongs to the thread that opened it. Checkpoints nest on
/// that thread; other threads cannot open one until the outermost is
/// resolved, and their writes meanwhile are not journaled.
pub trait DataStore: Send + Sync {
    /// Address of this data store (part of order key derivation).
    fn address(&self) -> Address;

    /// Block number used to stamp orders and check price age.
    fn current_block(&self) -> u64;

    /// Increment the nonce and return the new value.
    fn increment_nonce(&self) -> u64;

    fn get_bool(&self, key: &B256) -> bool;

    fn set_bool(&self, key: B256, value: bool);

    fn get_position(&self, key: &B256) -> Option<Position>;

    fn set_position(&self, position: Position);

    fn remove_position(&self, key: &B256);

    fn get_order(&self, key: &OrderKey) -> Option<Order>;

    /// Insert a new order. Fails if the key is already taken.
    fn insert_order(&self, order: Order) -> VenueResult<()>;

    fn set_order_status(&self, key: &OrderKey, status: OrderStatus) -> VenueResult<()>;

    /// # Errors
    /// `CheckpointBusy` if another thread holds an open checkpoint.
    fn checkpoint(&self) -> VenueResult<Checkpoint>;

    /// Undo every write made since `checkpoint` and close it. Returns the
    /// number of writes undone.
    fn revert_to(&self, checkpoint: Checkpoint) -> VenueResult<usize>;

    /// Keep the writes made since `checkpoint` and close it.
    fn commit(&self, checkpoint: Checkpoint) -> VenueResult<()>;
}
