use cartkeeper_app::context::AppContext;
use clap::Args;

use crate::cli::CartRef;

#[derive(Debug, Args)]
pub(crate) struct ResetCartArgs {
    #[command(flatten)]
    target: CartRef,
}

pub(crate) async fn run(app: &AppContext, args: ResetCartArgs) -> Result<(), String> {
    app.carts
        .reset_cart(app.deadline(), args.target.cart, args.target.owner)
        .await
        .map_err(|error| format!("failed to reset cart: {error}"))?;

    println!("cart_id: {}", args.target.cart);

    Ok(())
}
