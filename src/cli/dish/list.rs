use clap::Args;
use tavola::{
    database::{self, Db},
    domain::catalog::{CatalogService, PgCatalogService, models::RestaurantUuid},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ListDishesArgs {
    /// Restaurant whose menu to list
    #[arg(long)]
    restaurant_uuid: Uuid,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListDishesArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCatalogService::new(Db::new(pool));

    let dishes = service
        .list_dishes(RestaurantUuid::from_uuid(args.restaurant_uuid))
        .await
        .map_err(|error| format!("failed to list dishes: {error}"))?;

    for dish in dishes {
        println!("{}  {}  {}", dish.uuid, dish.name, dish.price);
    }

    Ok(())
}
