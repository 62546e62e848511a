use cartkeeper_app::context::AppContext;
use clap::{Args, Subcommand};

mod create;
mod get;
mod remove;
mod reset;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print a cart as JSON
    Get(get::GetCartArgs),
    /// Create a cart
    Create(create::CreateCartArgs),
    /// Delete a cart and print what it held
    Remove(remove::RemoveCartArgs),
    /// Clear every item from a cart
    Reset(reset::ResetCartArgs),
}

pub(crate) async fn run(app: &AppContext, command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Get(args) => get::run(app, args).await,
        CartSubcommand::Create(args) => create::run(app, args).await,
        CartSubcommand::Remove(args) => remove::run(app, args).await,
        CartSubcommand::Reset(args) => reset::run(app, args).await,
    }
}
