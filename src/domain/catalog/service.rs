//! Catalog service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::catalog::{
        errors::CatalogServiceError,
        models::{Dish, DishUuid, NewDish, NewRestaurant, Restaurant, RestaurantUuid},
        repository::{PgDishesRepository, PgRestaurantsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    restaurants: PgRestaurantsRepository,
    dishes: PgDishesRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            restaurants: PgRestaurantsRepository::new(),
            dishes: PgDishesRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    #[tracing::instrument(name = "catalog.service.create_restaurant", skip(self, restaurant), err)]
    async fn create_restaurant(
        &self,
        restaurant: NewRestaurant,
    ) -> Result<Restaurant, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .restaurants
            .create_restaurant(&mut tx, restaurant.uuid, &restaurant.name)
            .await?;

        tx.commit().await?;

        info!(restaurant_uuid = %created.uuid, "created restaurant");

        Ok(created)
    }

    async fn get_restaurant(
        &self,
        restaurant: RestaurantUuid,
    ) -> Result<Restaurant, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let restaurant = self.restaurants.get_restaurant(&mut tx, restaurant).await?;

        tx.commit().await?;

        Ok(restaurant)
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let restaurants = self.restaurants.list_restaurants(&mut tx).await?;

        tx.commit().await?;

        Ok(restaurants)
    }

    #[tracing::instrument(name = "catalog.service.create_dish", skip(self, dish), err)]
    async fn create_dish(&self, dish: NewDish) -> Result<Dish, CatalogServiceError> {
        // Prices are unsigned in the model but BIGINT in the column.
        let price = i64::try_from(dish.price)?;

        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .dishes
            .create_dish(&mut tx, dish.uuid, dish.restaurant_uuid, &dish.name, price)
            .await?;

        tx.commit().await?;

        info!(dish_uuid = %created.uuid, restaurant_uuid = %created.restaurant_uuid, "created dish");

        Ok(created)
    }

    async fn get_dish(&self, dish: DishUuid) -> Result<Dish, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let dish = self.dishes.get_dish(&mut tx, dish).await?;

        tx.commit().await?;

        Ok(dish)
    }

    async fn list_dishes(
        &self,
        restaurant: RestaurantUuid,
    ) -> Result<Vec<Dish>, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let dishes = self.dishes.list_dishes(&mut tx, restaurant).await?;

        tx.commit().await?;

        Ok(dishes)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Creates a new restaurant with the given details.
    async fn create_restaurant(
        &self,
        restaurant: NewRestaurant,
    ) -> Result<Restaurant, CatalogServiceError>;

    /// Retrieve a single restaurant.
    async fn get_restaurant(
        &self,
        restaurant: RestaurantUuid,
    ) -> Result<Restaurant, CatalogServiceError>;

    /// Retrieves all restaurants.
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, CatalogServiceError>;

    /// Creates a new dish on a restaurant's menu.
    async fn create_dish(&self, dish: NewDish) -> Result<Dish, CatalogServiceError>;

    /// Retrieve a single dish.
    async fn get_dish(&self, dish: DishUuid) -> Result<Dish, CatalogServiceError>;

    /// Retrieves all dishes on a restaurant's menu.
    async fn list_dishes(
        &self,
        restaurant: RestaurantUuid,
    ) -> Result<Vec<Dish>, CatalogServiceError>;
}
