//! Carts service.

use std::{fmt, num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, warn};

use crate::{
    deadline::Deadline,
    domain::carts::{
        errors::CartsServiceError,
        models::{Cart, CartId, ItemId, ItemQuantity, MAX_QUANTITY, OwnerId},
        records::{self, OWNER_FIELD},
    },
    store::{Guarded, KvStore, StoreError},
};

/// Carts stored as hash records in a [`KvStore`].
///
/// Holds no cart state between calls; every operation is a single store round
/// trip. Mutations are guarded on the record's owner field, so the ownership
/// check and the write it protects happen in one atomic command. Reads check
/// the owner recorded in the snapshot they return.
#[derive(Clone)]
pub struct KvCartsService {
    store: Arc<dyn KvStore>,
}

impl KvCartsService {
    /// Service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }
}

impl fmt::Debug for KvCartsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvCartsService").finish_non_exhaustive()
    }
}

fn ownership_mismatch(
    cart: CartId,
    claimed_owner: OwnerId,
    actual_owner: OwnerId,
) -> CartsServiceError {
    warn!(
        cart_id = %cart,
        claimed_owner = %claimed_owner,
        actual_owner = %actual_owner,
        "cart ownership mismatch"
    );

    CartsServiceError::OwnershipMismatch {
        cart,
        claimed_owner,
        actual_owner,
    }
}

/// Resolve the outcome of a command guarded on `claimed_owner`.
fn settle<T>(
    cart: CartId,
    claimed_owner: OwnerId,
    outcome: Guarded<T>,
) -> Result<T, CartsServiceError> {
    match outcome {
        Guarded::Applied(value) => Ok(value),
        Guarded::Missing => Err(CartsServiceError::NotFound),
        Guarded::Mismatch(stored) => {
            let key = records::cart_key(cart);
            let actual_owner = records::parse_owner(&key, &stored)?;

            // a non-canonical spelling of the caller's own id
            if actual_owner == claimed_owner {
                return Err(StoreError::invalid_data(&key, OWNER_FIELD, &stored).into());
            }

            Err(ownership_mismatch(cart, claimed_owner, actual_owner))
        }
    }
}

#[async_trait]
impl CartsService for KvCartsService {
    #[tracing::instrument(
        name = "carts.service.get_cart",
        skip(self, deadline),
        fields(cart_id = %cart, owner_id = %owner),
        err
    )]
    async fn get_cart(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
    ) -> Result<Cart, CartsServiceError> {
        let fields = deadline
            .run(self.store.hgetall(&records::cart_key(cart)))
            .await?;

        let snapshot = records::decode(cart, fields)?.ok_or(CartsServiceError::NotFound)?;

        if snapshot.owner != owner {
            return Err(ownership_mismatch(cart, owner, snapshot.owner));
        }

        Ok(snapshot)
    }

    #[tracing::instrument(
        name = "carts.service.add_cart",
        skip(self, deadline, cart),
        fields(cart_id = %cart.id, owner_id = %cart.owner, item_count = cart.items.len()),
        err
    )]
    async fn add_cart(&self, deadline: Deadline, cart: Cart) -> Result<(), CartsServiceError> {
        if let Some((&item, &quantity)) = cart
            .items
            .iter()
            .find(|&(_, &quantity)| quantity > MAX_QUANTITY)
        {
            return Err(CartsServiceError::QuantityTooLarge { item, quantity });
        }

        let key = records::cart_key(cart.id);

        if deadline.run(self.store.exists(&key)).await? {
            return Err(CartsServiceError::AlreadyExists);
        }

        let written = deadline
            .run(self.store.hset_if_absent(&key, records::encode(&cart)))
            .await?;

        if !written {
            return Err(CartsServiceError::AlreadyExists);
        }

        debug!(cart_id = %cart.id, "created cart");

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.remove_cart",
        skip(self, deadline),
        fields(cart_id = %cart, owner_id = %owner),
        err
    )]
    async fn remove_cart(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
    ) -> Result<Cart, CartsServiceError> {
        let key = records::cart_key(cart);

        let outcome = deadline
            .run(self.store.take_hash(&key, &records::owner_guard(owner)))
            .await?;

        let fields = settle(cart, owner, outcome)?;

        let removed = records::decode(cart, fields)?.ok_or(CartsServiceError::NotFound)?;

        debug!(cart_id = %cart, "removed cart");

        Ok(removed)
    }

    #[tracing::instrument(
        name = "carts.service.reset_cart",
        skip(self, deadline),
        fields(cart_id = %cart, owner_id = %owner),
        err
    )]
    async fn reset_cart(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
    ) -> Result<(), CartsServiceError> {
        let key = records::cart_key(cart);

        let outcome = deadline
            .run(self.store.retain_guard_field(&key, &records::owner_guard(owner)))
            .await?;

        let removed = settle(cart, owner, outcome)?;

        debug!(cart_id = %cart, removed, "reset cart");

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, deadline),
        fields(cart_id = %cart, owner_id = %owner, item_id = %item),
        err
    )]
    async fn add_item(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
        item: ItemId,
        delta: NonZeroU32,
    ) -> Result<ItemQuantity, CartsServiceError> {
        let key = records::cart_key(cart);
        let field = records::item_field(item);

        let outcome = deadline
            .run(self.store.hincrby_guarded(
                &key,
                &records::owner_guard(owner),
                &field,
                i64::from(delta.get()),
            ))
            .await?;

        let quantity = records::quantity(&key, &field, settle(cart, owner, outcome)?)?;

        debug!(cart_id = %cart, item_id = %item, quantity, "added item units");

        Ok(ItemQuantity { item, quantity })
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self, deadline),
        fields(cart_id = %cart, owner_id = %owner, item_id = %item),
        err
    )]
    async fn remove_item(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
        item: ItemId,
        delta: NonZeroU32,
    ) -> Result<ItemQuantity, CartsServiceError> {
        let key = records::cart_key(cart);
        let field = records::item_field(item);

        let outcome = deadline
            .run(self.store.hdecrby_floor_guarded(
                &key,
                &records::owner_guard(owner),
                &field,
                i64::from(delta.get()),
            ))
            .await?;

        let quantity = records::quantity(&key, &field, settle(cart, owner, outcome)?)?;

        debug!(cart_id = %cart, item_id = %item, quantity, "removed item units");

        Ok(ItemQuantity { item, quantity })
    }

    #[tracing::instrument(
        name = "carts.service.remove_item_fully",
        skip(self, deadline),
        fields(cart_id = %cart, owner_id = %owner, item_id = %item),
        err
    )]
    async fn remove_item_fully(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
        item: ItemId,
    ) -> Result<ItemId, CartsServiceError> {
        let key = records::cart_key(cart);

        let outcome = deadline
            .run(self.store.hdel_guarded(
                &key,
                &records::owner_guard(owner),
                &records::item_field(item),
            ))
            .await?;

        let was_present = settle(cart, owner, outcome)?;

        debug!(cart_id = %cart, item_id = %item, was_present, "removed item");

        Ok(item)
    }
}

/// Cart operations, each checked against the caller's identity.
#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve a snapshot of a cart owned by `owner`.
    async fn get_cart(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
    ) -> Result<Cart, CartsServiceError>;

    /// Create a cart with its owner and initial items.
    async fn add_cart(&self, deadline: Deadline, cart: Cart) -> Result<(), CartsServiceError>;

    /// Delete a cart, returning what it held.
    async fn remove_cart(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
    ) -> Result<Cart, CartsServiceError>;

    /// Clear every item from a cart, keeping its id and owner.
    async fn reset_cart(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
    ) -> Result<(), CartsServiceError>;

    /// Add `delta` units of an item.
    async fn add_item(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
        item: ItemId,
        delta: NonZeroU32,
    ) -> Result<ItemQuantity, CartsServiceError>;

    /// Remove up to `delta` units of an item; the quantity stops at zero.
    async fn remove_item(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
        item: ItemId,
        delta: NonZeroU32,
    ) -> Result<ItemQuantity, CartsServiceError>;

    /// Drop an item from a cart whatever its quantity.
    async fn remove_item_fully(
        &self,
        deadline: Deadline,
        cart: CartId,
        owner: OwnerId,
        item: ItemId,
    ) -> Result<ItemId, CartsServiceError>;
}
