use cartkeeper_app::context::AppContext;

use crate::cli::item::AdjustItemArgs;

pub(crate) async fn run(app: &AppContext, args: AdjustItemArgs) -> Result<(), String> {
    let adjusted = app
        .carts
        .remove_item(
            app.deadline(),
            args.target.cart,
            args.target.owner,
            args.item,
            args.quantity,
        )
        .await
        .map_err(|error| format!("failed to remove item: {error}"))?;

    println!("item_id: {}", adjusted.item);
    println!("quantity: {}", adjusted.quantity);

    Ok(())
}
