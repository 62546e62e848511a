//! Test Helpers

use std::num::NonZeroU32;

use crate::{
    domain::carts::{
        CartsService, CartsServiceError,
        models::{Cart, CartId, ItemId, ItemQuantity, OwnerId},
    },
    test::TestContext,
};

pub(crate) fn delta(units: u32) -> NonZeroU32 {
    NonZeroU32::new(units).expect("test deltas must be non-zero")
}

pub(crate) async fn create_cart(
    ctx: &TestContext,
    cart: u64,
    owner: OwnerId,
) -> Result<CartId, CartsServiceError> {
    let cart = CartId::new(cart);

    ctx.carts
        .add_cart(ctx.deadline(), Cart::new(cart, owner))
        .await?;

    Ok(cart)
}

pub(crate) async fn add_item(
    ctx: &TestContext,
    cart: CartId,
    owner: OwnerId,
    item: ItemId,
    units: u32,
) -> Result<ItemQuantity, CartsServiceError> {
    ctx.carts
        .add_item(ctx.deadline(), cart, owner, item, delta(units))
        .await
}

pub(crate) async fn remove_item(
    ctx: &TestContext,
    cart: CartId,
    owner: OwnerId,
    item: ItemId,
    units: u32,
) -> Result<ItemQuantity, CartsServiceError> {
    ctx.carts
        .remove_item(ctx.deadline(), cart, owner, item, delta(units))
        .await
}
