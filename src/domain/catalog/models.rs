//! Catalog Models

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Restaurant UUID
pub type RestaurantUuid = TypedUuid<Restaurant>;

/// Restaurant Model
#[derive(Debug, Clone)]
pub struct Restaurant {
    pub uuid: RestaurantUuid,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Restaurant Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewRestaurant {
    pub uuid: RestaurantUuid,
    pub name: String,
}

/// Dish UUID
pub type DishUuid = TypedUuid<Dish>;

/// Dish Model
///
/// `price` is in minor currency units.
#[derive(Debug, Clone)]
pub struct Dish {
    pub uuid: DishUuid,
    pub restaurant_uuid: RestaurantUuid,
    pub name: String,
    pub price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Dish Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewDish {
    pub uuid: DishUuid,
    pub restaurant_uuid: RestaurantUuid,
    pub name: String,
    pub price: u64,
}
