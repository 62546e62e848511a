//! Carts service errors.

use thiserror::Error;

use crate::{
    domain::carts::models::{CartId, ItemId, MAX_QUANTITY, OwnerId},
    store::StoreError,
};

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartsServiceError {
    /// No cart exists under the requested id.
    #[error("cart not found")]
    NotFound,

    /// A cart already exists under the id being created.
    #[error("cart already exists")]
    AlreadyExists,

    /// The cart belongs to someone other than the caller.
    #[error("cart #{cart} is owned by user #{actual_owner}, but user #{claimed_owner} made the request")]
    OwnershipMismatch {
        /// Cart the request named.
        cart: CartId,
        /// Owner the caller authenticated as.
        claimed_owner: OwnerId,
        /// Owner recorded on the cart.
        actual_owner: OwnerId,
    },

    /// A new cart holds more of an item than the store can count.
    #[error("quantity {quantity} of item #{item} exceeds the limit of {limit}", limit = MAX_QUANTITY)]
    QuantityTooLarge {
        /// Offending item.
        item: ItemId,
        /// Quantity requested for it.
        quantity: u64,
    },

    /// The store call failed or returned malformed data.
    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for CartsServiceError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}
