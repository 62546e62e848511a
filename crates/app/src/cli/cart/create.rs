use cartkeeper_app::{
    context::AppContext,
    domain::carts::models::{Cart, ItemId},
};
use clap::Args;

use crate::cli::CartRef;

#[derive(Debug, Args)]
pub(crate) struct CreateCartArgs {
    #[command(flatten)]
    target: CartRef,

    /// Initial item as `ITEM=QUANTITY`; may be repeated
    #[arg(long = "item", value_parser = parse_item)]
    items: Vec<(ItemId, u64)>,
}

fn parse_item(value: &str) -> Result<(ItemId, u64), String> {
    let (item, quantity) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ITEM=QUANTITY, got `{value}`"))?;

    let item = item
        .trim()
        .parse()
        .map_err(|error| format!("invalid item id `{item}`: {error}"))?;

    let quantity = quantity
        .trim()
        .parse()
        .map_err(|error| format!("invalid quantity `{quantity}`: {error}"))?;

    Ok((item, quantity))
}

pub(crate) async fn run(app: &AppContext, args: CreateCartArgs) -> Result<(), String> {
    let cart = args
        .items
        .into_iter()
        .fold(Cart::new(args.target.cart, args.target.owner), |cart, (item, quantity)| {
            cart.with_item(item, quantity)
        });

    let id = cart.id;

    app.carts
        .add_cart(app.deadline(), cart)
        .await
        .map_err(|error| format!("failed to create cart: {error}"))?;

    println!("cart_id: {id}");

    Ok(())
}
