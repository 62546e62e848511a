use cartkeeper_app::context::AppContext;
use clap::Args;

use crate::cli::CartRef;

#[derive(Debug, Args)]
pub(crate) struct GetCartArgs {
    #[command(flatten)]
    target: CartRef,
}

pub(crate) async fn run(app: &AppContext, args: GetCartArgs) -> Result<(), String> {
    let cart = app
        .carts
        .get_cart(app.deadline(), args.target.cart, args.target.owner)
        .await
        .map_err(|error| format!("failed to get cart: {error}"))?;

    let json = serde_json::to_string_pretty(&cart)
        .map_err(|error| format!("failed to encode cart: {error}"))?;

    println!("{json}");

    Ok(())
}
