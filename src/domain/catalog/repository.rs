//! Catalog Repositories

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::catalog::models::{Dish, DishUuid, Restaurant, RestaurantUuid};

const CREATE_RESTAURANT_SQL: &str = include_str!("sql/create_restaurant.sql");
const GET_RESTAURANT_SQL: &str = include_str!("sql/get_restaurant.sql");
const LIST_RESTAURANTS_SQL: &str = include_str!("sql/list_restaurants.sql");
const CREATE_DISH_SQL: &str = include_str!("sql/create_dish.sql");
const GET_DISH_SQL: &str = include_str!("sql/get_dish.sql");
const LIST_DISHES_SQL: &str = include_str!("sql/list_dishes.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgRestaurantsRepository;

impl PgRestaurantsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_restaurant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        restaurant: RestaurantUuid,
        name: &str,
    ) -> Result<Restaurant, sqlx::Error> {
        query_as::<Postgres, Restaurant>(CREATE_RESTAURANT_SQL)
            .bind(restaurant.into_uuid())
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_restaurant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        restaurant: RestaurantUuid,
    ) -> Result<Restaurant, sqlx::Error> {
        query_as::<Postgres, Restaurant>(GET_RESTAURANT_SQL)
            .bind(restaurant.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_restaurants(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Restaurant>, sqlx::Error> {
        query_as::<Postgres, Restaurant>(LIST_RESTAURANTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDishesRepository;

impl PgDishesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_dish(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        dish: DishUuid,
        restaurant: RestaurantUuid,
        name: &str,
        price: i64,
    ) -> Result<Dish, sqlx::Error> {
        query_as::<Postgres, Dish>(CREATE_DISH_SQL)
            .bind(dish.into_uuid())
            .bind(restaurant.into_uuid())
            .bind(name)
            .bind(price)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_dish(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        dish: DishUuid,
    ) -> Result<Dish, sqlx::Error> {
        query_as::<Postgres, Dish>(GET_DISH_SQL)
            .bind(dish.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_dishes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        restaurant: RestaurantUuid,
    ) -> Result<Vec<Dish>, sqlx::Error> {
        query_as::<Postgres, Dish>(LIST_DISHES_SQL)
            .bind(restaurant.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Restaurant {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: RestaurantUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Dish {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let price = try_get_amount(row, "price")?;

        Ok(Self {
            uuid: DishUuid::from_uuid(row.try_get("uuid")?),
            restaurant_uuid: RestaurantUuid::from_uuid(row.try_get("restaurant_id")?),
            name: row.try_get("name")?,
            price,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
