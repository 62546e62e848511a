//! Cart Models

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ids::TypedId;

/// Cart Id
pub type CartId = TypedId<Cart>;

/// Identity that owns a cart, as authenticated by the caller.
pub type OwnerId = TypedId<Owner>;

/// Item Id
pub type ItemId = TypedId<Item>;

/// Largest quantity a cart can hold for one item.
///
/// Quantities are kept as signed 64-bit counters in the store.
pub const MAX_QUANTITY: u64 = i64::MAX.unsigned_abs();

/// Marker for [`OwnerId`].
#[derive(Debug)]
pub enum Owner {}

/// Marker for [`ItemId`].
#[derive(Debug)]
pub enum Item {}

/// Cart Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart id.
    pub id: CartId,
    /// Identity allowed to read and change the cart.
    pub owner: OwnerId,
    /// Quantity held per item.
    pub items: FxHashMap<ItemId, u64>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new(id: CartId, owner: OwnerId) -> Self {
        Self {
            id,
            owner,
            items: FxHashMap::default(),
        }
    }

    /// Set the quantity held for `item`.
    #[must_use]
    pub fn with_item(mut self, item: ItemId, quantity: u64) -> Self {
        self.items.insert(item, quantity);
        self
    }

    /// Quantity held for `item`, zero when it has no entry.
    #[must_use]
    pub fn quantity(&self, item: ItemId) -> u64 {
        self.items.get(&item).copied().unwrap_or(0)
    }
}

/// Quantity of an item after an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemQuantity {
    /// Item that was adjusted.
    pub item: ItemId,
    /// Quantity held after the adjustment.
    pub quantity: u64,
}
