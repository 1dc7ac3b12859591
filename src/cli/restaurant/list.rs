use clap::Args;
use tavola::{
    database::{self, Db},
    domain::catalog::{CatalogService, PgCatalogService},
};

#[derive(Debug, Args)]
pub(crate) struct ListRestaurantsArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListRestaurantsArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCatalogService::new(Db::new(pool));

    let restaurants = service
        .list_restaurants()
        .await
        .map_err(|error| format!("failed to list restaurants: {error}"))?;

    for restaurant in restaurants {
        println!("{}  {}", restaurant.uuid, restaurant.name);
    }

    Ok(())
}
