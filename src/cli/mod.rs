use clap::{Parser, Subcommand};

mod dish;
mod restaurant;

#[derive(Debug, Parser)]
#[command(name = "tavola", about = "Tavola CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Restaurant(restaurant::RestaurantCommand),
    Dish(dish::DishCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Restaurant(command) => restaurant::run(command).await,
            Commands::Dish(command) => dish::run(command).await,
        }
    }
}
