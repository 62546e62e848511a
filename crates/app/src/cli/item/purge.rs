use cartkeeper_app::{context::AppContext, domain::carts::models::ItemId};
use clap::Args;

use crate::cli::CartRef;

#[derive(Debug, Args)]
pub(crate) struct PurgeItemArgs {
    #[command(flatten)]
    target: CartRef,

    /// Item id
    #[arg(long)]
    item: ItemId,
}

pub(crate) async fn run(app: &AppContext, args: PurgeItemArgs) -> Result<(), String> {
    let item = app
        .carts
        .remove_item_fully(app.deadline(), args.target.cart, args.target.owner, args.item)
        .await
        .map_err(|error| format!("failed to remove item: {error}"))?;

    println!("item_id: {item}");

    Ok(())
}
