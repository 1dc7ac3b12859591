//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    carts::{models::CartLineView, repository::try_get_owner},
    catalog::{
        models::{DishUuid, RestaurantUuid},
        repository::try_get_amount,
    },
    orders::models::{Order, OrderLine, OrderLineUuid, OrderUuid},
    owners::{Owner, SessionToken, UserUuid},
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_LINE_SQL: &str = include_str!("sql/create_order_line.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LIST_ORDER_LINES_SQL: &str = include_str!("sql/list_order_lines.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        owner: &Owner,
        restaurant: RestaurantUuid,
        total: u64,
    ) -> Result<Order, sqlx::Error> {
        let total_i64 = i64::try_from(total).map_err(|e| sqlx::Error::ColumnDecode {
            index: "total".to_string(),
            source: Box::new(e),
        })?;

        query_as::<Postgres, Order>(CREATE_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(owner.user_uuid().map(UserUuid::into_uuid))
            .bind(owner.session_token().map(SessionToken::as_str))
            .bind(restaurant.into_uuid())
            .bind(total_i64)
            .fetch_one(&mut **tx)
            .await
    }

    /// Snapshot one cart line into the order.
    pub(crate) async fn create_order_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        item: &CartLineView,
    ) -> Result<OrderLine, sqlx::Error> {
        let unit_price = i64::try_from(item.unit_price).map_err(|e| sqlx::Error::ColumnDecode {
            index: "unit_price".to_string(),
            source: Box::new(e),
        })?;

        let quantity = i64::try_from(item.line.quantity).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        query_as::<Postgres, OrderLine>(CREATE_ORDER_LINE_SQL)
            .bind(OrderLineUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(item.line.dish_uuid.into_uuid())
            .bind(&item.dish_name)
            .bind(unit_price)
            .bind(quantity)
            .bind(&item.line.options)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_order_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderLine>, sqlx::Error> {
        query_as::<Postgres, OrderLine>(LIST_ORDER_LINES_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let total = try_get_amount(row, "total")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            owner: try_get_owner(row)?,
            restaurant_uuid: RestaurantUuid::from_uuid(row.try_get("restaurant_id")?),
            total,
            lines: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let unit_price = try_get_amount(row, "unit_price")?;
        let quantity = try_get_amount(row, "quantity")?;

        Ok(Self {
            uuid: OrderLineUuid::from_uuid(row.try_get("uuid")?),
            dish_uuid: DishUuid::from_uuid(row.try_get("dish_id")?),
            dish_name: row.try_get("dish_name")?,
            unit_price,
            quantity,
            options: row.try_get("options")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
