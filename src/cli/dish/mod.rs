use clap::{Args, Subcommand};

mod create;
mod list;

#[derive(Debug, Args)]
pub(crate) struct DishCommand {
    #[command(subcommand)]
    command: DishSubcommand,
}

#[derive(Debug, Subcommand)]
enum DishSubcommand {
    Create(create::CreateDishArgs),
    List(list::ListDishesArgs),
}

pub(crate) async fn run(command: DishCommand) -> Result<(), String> {
    match command.command {
        DishSubcommand::Create(args) => create::run(args).await,
        DishSubcommand::List(args) => list::run(args).await,
    }
}
