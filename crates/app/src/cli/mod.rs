use cartkeeper_app::{
    config::{LoggingConfig, StoreConfig},
    context::AppContext,
    domain::carts::models::{CartId, OwnerId},
    logging,
};
use clap::{Args, Parser, Subcommand};

mod cart;
mod item;

#[derive(Debug, Parser)]
#[command(name = "cartkeeper-app", about = "Cartkeeper CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Cart(cart::CartCommand),
    Item(item::ItemCommand),
}

/// Identifies a cart and the user acting on it.
#[derive(Debug, Args)]
pub(crate) struct CartRef {
    /// Cart id
    #[arg(long)]
    pub cart: CartId,

    /// Id of the authenticated user making the request
    #[arg(long)]
    pub owner: OwnerId,
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        logging::init(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        let app = AppContext::from_config(&self.store)
            .await
            .map_err(|error| format!("failed to initialise app context: {error}"))?;

        match self.command {
            Commands::Cart(command) => cart::run(&app, command).await,
            Commands::Item(command) => item::run(&app, command).await,
        }
    }
}
