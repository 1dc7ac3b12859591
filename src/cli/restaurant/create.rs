use clap::Args;
use tavola::{
    database::{self, Db},
    domain::catalog::{
        CatalogService, PgCatalogService,
        models::{NewRestaurant, RestaurantUuid},
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateRestaurantArgs {
    /// Restaurant display name
    #[arg(long)]
    name: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Optional restaurant UUID; generated when omitted
    #[arg(long)]
    restaurant_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateRestaurantArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCatalogService::new(Db::new(pool));

    let uuid = args
        .restaurant_uuid
        .map_or_else(RestaurantUuid::new, RestaurantUuid::from_uuid);

    let restaurant = service
        .create_restaurant(NewRestaurant {
            uuid,
            name: args.name,
        })
        .await
        .map_err(|error| format!("failed to create restaurant: {error}"))?;

    println!("restaurant_uuid: {}", restaurant.uuid);
    println!("restaurant_name: {}", restaurant.name);

    Ok(())
}
