use clap::Args;
use tavola::{
    database::{self, Db},
    domain::catalog::{
        CatalogService, PgCatalogService,
        models::{DishUuid, NewDish, RestaurantUuid},
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateDishArgs {
    /// Restaurant the dish belongs to
    #[arg(long)]
    restaurant_uuid: Uuid,

    /// Dish display name
    #[arg(long)]
    name: String,

    /// Price in minor currency units (e.g. cents)
    #[arg(long)]
    price: u64,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Optional dish UUID; generated when omitted
    #[arg(long)]
    dish_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateDishArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCatalogService::new(Db::new(pool));

    let uuid = args.dish_uuid.map_or_else(DishUuid::new, DishUuid::from_uuid);

    let dish = service
        .create_dish(NewDish {
            uuid,
            restaurant_uuid: RestaurantUuid::from_uuid(args.restaurant_uuid),
            name: args.name,
            price: args.price,
        })
        .await
        .map_err(|error| format!("failed to create dish: {error}"))?;

    println!("dish_uuid: {}", dish.uuid);
    println!("dish_name: {}", dish.name);
    println!("price: {}", dish.price);

    Ok(())
}
