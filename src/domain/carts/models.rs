//! Cart Models

use jiff::Timestamp;
use serde_json::Value;

use crate::{
    domain::{
        catalog::models::{DishUuid, RestaurantUuid},
        owners::Owner,
    },
    uuids::TypedUuid,
};

/// Cart Line UUID
pub type CartLineUuid = TypedUuid<CartLine>;

/// One (owner, dish) row with a quantity and customization options.
///
/// A line only exists while `quantity >= 1`; a zero-quantity update deletes
/// the row instead of storing zero.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub uuid: CartLineUuid,
    pub owner: Owner,
    pub restaurant_uuid: RestaurantUuid,
    pub dish_uuid: DishUuid,
    pub quantity: u64,
    pub options: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cart line joined with its dish and restaurant summaries, as returned
/// by cart listings.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub line: CartLine,
    pub dish_name: String,
    pub unit_price: u64,
    pub restaurant_name: String,
}

impl CartLineView {
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(self.line.quantity)
    }
}

/// Outcome of a quantity change: the resulting line, or a tombstone when
/// the change removed it.
#[derive(Debug, Clone)]
pub enum CartChange {
    Updated(CartLine),
    Removed,
}
