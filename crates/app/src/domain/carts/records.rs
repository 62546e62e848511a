//! Cart Records
//!
//! A cart is stored as one hash under `cart:{id}`. The `owner` field holds the
//! owner id and every other field maps a decimal item id to its quantity.

use crate::{
    domain::carts::models::{Cart, CartId, ItemId, OwnerId},
    store::{Guard, HashFields, StoreError},
};

pub(crate) const CART_KEY_PREFIX: &str = "cart:";

pub(crate) const OWNER_FIELD: &str = "owner";

pub(crate) fn cart_key(cart: CartId) -> String {
    format!("{CART_KEY_PREFIX}{cart}")
}

pub(crate) fn item_field(item: ItemId) -> String {
    item.to_string()
}

/// Guard that only lets `owner` change their own cart.
pub(crate) fn owner_guard(owner: OwnerId) -> Guard {
    Guard::new(OWNER_FIELD, owner.to_string())
}

pub(crate) fn parse_owner(key: &str, value: &str) -> Result<OwnerId, StoreError> {
    value
        .parse()
        .map_err(|_error| StoreError::invalid_data(key, OWNER_FIELD, value))
}

/// Convert a counter reply into a quantity; counters never go below zero.
pub(crate) fn quantity(key: &str, field: &str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_error| StoreError::invalid_data(key, field, &value.to_string()))
}

/// Flatten a cart into hash fields.
pub(crate) fn encode(cart: &Cart) -> Vec<(String, String)> {
    let mut fields = Vec::with_capacity(cart.items.len() + 1);

    fields.push((OWNER_FIELD.to_owned(), cart.owner.to_string()));

    fields.extend(
        cart.items
            .iter()
            .map(|(item, quantity)| (item_field(*item), quantity.to_string())),
    );

    fields
}

/// Rebuild a cart from its hash fields.
///
/// Returns `None` when the record has no owner, which is how an absent key
/// reads back.
pub(crate) fn decode(cart: CartId, fields: HashFields) -> Result<Option<Cart>, StoreError> {
    let key = cart_key(cart);

    let Some(owner) = fields.get(OWNER_FIELD) else {
        return Ok(None);
    };

    let mut decoded = Cart::new(cart, parse_owner(&key, owner)?);

    for (field, value) in &fields {
        if field == OWNER_FIELD {
            continue;
        }

        let item: ItemId = field
            .parse()
            .map_err(|_error| StoreError::invalid_data(&key, field, value))?;

        let counter: i64 = value
            .parse()
            .map_err(|_error| StoreError::invalid_data(&key, field, value))?;

        decoded.items.insert(item, quantity(&key, field, counter)?);
    }

    Ok(Some(decoded))
}
