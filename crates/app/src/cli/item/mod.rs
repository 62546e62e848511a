use std::num::NonZeroU32;

use cartkeeper_app::{context::AppContext, domain::carts::models::ItemId};
use clap::{Args, Subcommand};

use crate::cli::CartRef;

mod add;
mod purge;
mod remove;

#[derive(Debug, Args)]
pub(crate) struct ItemCommand {
    #[command(subcommand)]
    command: ItemSubcommand,
}

#[derive(Debug, Subcommand)]
enum ItemSubcommand {
    /// Add units of an item to a cart
    Add(AdjustItemArgs),
    /// Remove units of an item; the quantity stops at zero
    Remove(AdjustItemArgs),
    /// Drop an item from a cart entirely
    Purge(purge::PurgeItemArgs),
}

/// Arguments for commands that change an item's quantity.
#[derive(Debug, Args)]
pub(crate) struct AdjustItemArgs {
    #[command(flatten)]
    target: CartRef,

    /// Item id
    #[arg(long)]
    item: ItemId,

    /// Number of units, at least one
    #[arg(long, default_value = "1")]
    quantity: NonZeroU32,
}

pub(crate) async fn run(app: &AppContext, command: ItemCommand) -> Result<(), String> {
    match command.command {
        ItemSubcommand::Add(args) => add::run(app, args).await,
        ItemSubcommand::Remove(args) => remove::run(app, args).await,
        ItemSubcommand::Purge(args) => purge::run(app, args).await,
    }
}
