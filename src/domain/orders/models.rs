//! Order Models

use jiff::Timestamp;
use serde_json::Value;

use crate::{
    domain::{
        catalog::models::{DishUuid, RestaurantUuid},
        owners::Owner,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// An order created from a cart at checkout. `total` is in minor currency
/// units and fixed at creation time.
#[derive(Debug, Clone)]
pub struct Order {
    pub uuid: OrderUuid,
    pub owner: Owner,
    pub restaurant_uuid: RestaurantUuid,
    pub total: u64,
    pub lines: Vec<OrderLine>,
    pub created_at: Timestamp,
}

/// Order Line UUID
pub type OrderLineUuid = TypedUuid<OrderLine>;

/// One invoice line, snapshotting the dish name and price at checkout so
/// later catalog edits do not rewrite history.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub uuid: OrderLineUuid,
    pub dish_uuid: DishUuid,
    pub dish_name: String,
    pub unit_price: u64,
    pub quantity: u64,
    pub options: Value,
    pub created_at: Timestamp,
}
