//! Cart Lines Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use serde_json::Value;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    carts::models::{CartLine, CartLineUuid, CartLineView},
    catalog::{
        models::{DishUuid, RestaurantUuid},
        repository::try_get_amount,
    },
    owners::{Owner, SessionToken, UserUuid},
};

const LIST_CART_SQL: &str = include_str!("sql/list_cart.sql");
const CART_RESTAURANT_SQL: &str = include_str!("sql/cart_restaurant.sql");
const LOCK_LINE_SQL: &str = include_str!("sql/lock_line.sql");
const UPSERT_USER_LINE_SQL: &str = include_str!("sql/upsert_user_line.sql");
const UPSERT_GUEST_LINE_SQL: &str = include_str!("sql/upsert_guest_line.sql");
const DELETE_LINE_SQL: &str = include_str!("sql/delete_line.sql");
const CLEAR_CART_SQL: &str = include_str!("sql/clear_cart.sql");
const GUEST_LINES_FOR_UPDATE_SQL: &str = include_str!("sql/guest_lines_for_update.sql");
const USER_LINES_FOR_UPDATE_SQL: &str = include_str!("sql/user_lines_for_update.sql");
const DEMOTE_LINE_SQL: &str = include_str!("sql/demote_line.sql");
const MERGE_LINE_SQL: &str = include_str!("sql/merge_line.sql");
const ASSIGN_LINE_SQL: &str = include_str!("sql/assign_line.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartLinesRepository;

impl PgCartLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
    ) -> Result<Vec<CartLineView>, sqlx::Error> {
        let (user_id, session_token) = owner_binds(owner);

        query_as::<Postgres, CartLineView>(LIST_CART_SQL)
            .bind(user_id)
            .bind(session_token)
            .fetch_all(&mut **tx)
            .await
    }

    /// Restaurant the owner's cart is currently pinned to, if any.
    /// Locks the witnessing row for the remainder of the transaction.
    pub(crate) async fn cart_restaurant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
    ) -> Result<Option<RestaurantUuid>, sqlx::Error> {
        let (user_id, session_token) = owner_binds(owner);

        let restaurant: Option<Uuid> = query_scalar(CART_RESTAURANT_SQL)
            .bind(user_id)
            .bind(session_token)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(restaurant.map(RestaurantUuid::from_uuid))
    }

    /// `SELECT … FOR UPDATE` on the owner's line for the given dish,
    /// serializing concurrent quantity changes on the same line.
    pub(crate) async fn lock_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
        dish: DishUuid,
    ) -> Result<Option<CartLine>, sqlx::Error> {
        let (user_id, session_token) = owner_binds(owner);

        query_as::<Postgres, CartLine>(LOCK_LINE_SQL)
            .bind(user_id)
            .bind(session_token)
            .bind(dish.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert or replace the owner's line for the dish. `options = None`
    /// preserves stored options on update and defaults to `{}` on insert.
    pub(crate) async fn upsert_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
        restaurant: RestaurantUuid,
        dish: DishUuid,
        quantity: i64,
        options: Option<&Value>,
    ) -> Result<CartLine, sqlx::Error> {
        let sql = match owner {
            Owner::User(_) => UPSERT_USER_LINE_SQL,
            Owner::Guest(_) => UPSERT_GUEST_LINE_SQL,
        };

        let insert = query_as::<Postgres, CartLine>(sql).bind(CartLineUuid::new().into_uuid());

        let insert = match owner {
            Owner::User(user) => insert.bind(user.into_uuid()),
            Owner::Guest(token) => insert.bind(token.as_str().to_string()),
        };

        insert
            .bind(restaurant.into_uuid())
            .bind(dish.into_uuid())
            .bind(quantity)
            .bind(options)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: CartLineUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_LINE_SQL)
            .bind(line.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &Owner,
    ) -> Result<u64, sqlx::Error> {
        let (user_id, session_token) = owner_binds(owner);

        let rows_affected = query(CLEAR_CART_SQL)
            .bind(user_id)
            .bind(session_token)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// All guest lines under the token in creation order, locked for the
    /// remainder of the transaction.
    pub(crate) async fn guest_lines_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: &SessionToken,
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        query_as::<Postgres, CartLine>(GUEST_LINES_FOR_UPDATE_SQL)
            .bind(token.as_str())
            .fetch_all(&mut **tx)
            .await
    }

    /// All of the user's lines in creation order, locked for the remainder
    /// of the transaction.
    pub(crate) async fn user_lines_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        query_as::<Postgres, CartLine>(USER_LINES_FOR_UPDATE_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Strip a line of its user ownership and hand it to the guest session.
    pub(crate) async fn demote_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: CartLineUuid,
        token: &SessionToken,
    ) -> Result<(), sqlx::Error> {
        query(DEMOTE_LINE_SQL)
            .bind(line.into_uuid())
            .bind(token.as_str())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Fold an incoming quantity into an existing line, replacing its options.
    pub(crate) async fn merge_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: CartLineUuid,
        add_quantity: i64,
        options: &Value,
    ) -> Result<(), sqlx::Error> {
        query(MERGE_LINE_SQL)
            .bind(line.into_uuid())
            .bind(add_quantity)
            .bind(options)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Reassign a guest line to the authenticated user.
    pub(crate) async fn assign_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: CartLineUuid,
        user: UserUuid,
    ) -> Result<(), sqlx::Error> {
        query(ASSIGN_LINE_SQL)
            .bind(line.into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

fn owner_binds(owner: &Owner) -> (Option<Uuid>, Option<&str>) {
    (
        owner.user_uuid().map(UserUuid::into_uuid),
        owner.session_token().map(SessionToken::as_str),
    )
}

/// Rebuild the owner from the row's `user_id`/`session_token` pair.
pub(crate) fn try_get_owner(row: &PgRow) -> Result<Owner, sqlx::Error> {
    let user_id: Option<Uuid> = row.try_get("user_id")?;
    let session_token: Option<String> = row.try_get("session_token")?;

    Owner::from_columns(user_id, session_token).map_err(|e| sqlx::Error::ColumnDecode {
        index: "user_id".to_string(),
        source: e.into(),
    })
}

impl<'r> FromRow<'r, PgRow> for CartLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity = try_get_amount(row, "quantity")?;

        Ok(Self {
            uuid: CartLineUuid::from_uuid(row.try_get("uuid")?),
            owner: try_get_owner(row)?,
            restaurant_uuid: RestaurantUuid::from_uuid(row.try_get("restaurant_id")?),
            dish_uuid: DishUuid::from_uuid(row.try_get("dish_id")?),
            quantity,
            options: row.try_get("options")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartLineView {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let unit_price = try_get_amount(row, "unit_price")?;

        Ok(Self {
            line: CartLine::from_row(row)?,
            dish_name: row.try_get("dish_name")?,
            unit_price,
            restaurant_name: row.try_get("restaurant_name")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqlx::query;
    use uuid::Uuid;

    use crate::test::TestDb;

    async fn seed_catalog(tx: &mut sqlx::Transaction<'_, sqlx::Postgres>) -> (Uuid, Uuid) {
        let restaurant = Uuid::now_v7();
        let dish = Uuid::now_v7();

        query("INSERT INTO restaurants (uuid, name) VALUES ($1, 'Roma')")
            .bind(restaurant)
            .execute(&mut **tx)
            .await
            .expect("restaurant insert should succeed");

        query("INSERT INTO dishes (uuid, restaurant_id, name, price) VALUES ($1, $2, 'Carbonara', 1200)")
            .bind(dish)
            .bind(restaurant)
            .execute(&mut **tx)
            .await
            .expect("dish insert should succeed");

        (restaurant, dish)
    }

    #[tokio::test]
    async fn schema_rejects_a_line_with_both_owners() {
        let db = TestDb::new().await;
        let mut tx = db.begin_test_transaction().await;

        let (restaurant, dish) = seed_catalog(&mut tx).await;

        let result = query(
            "INSERT INTO cart_lines (uuid, user_id, session_token, restaurant_id, dish_id, quantity, options)
             VALUES ($1, $2, 'g1', $3, $4, 1, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(Uuid::now_v7())
        .bind(restaurant)
        .bind(dish)
        .bind(json!({}))
        .execute(&mut *tx)
        .await;

        let error = result.expect_err("insert with both owners must fail");

        assert!(
            matches!(
                error.as_database_error().map(sqlx::error::DatabaseError::kind),
                Some(sqlx::error::ErrorKind::CheckViolation)
            ),
            "expected check violation, got {error:?}"
        );
    }

    #[tokio::test]
    async fn schema_rejects_a_second_line_for_the_same_user_and_dish() {
        let db = TestDb::new().await;
        let mut tx = db.begin_test_transaction().await;

        let (restaurant, dish) = seed_catalog(&mut tx).await;
        let user = Uuid::now_v7();

        for attempt in 0..2 {
            let result = query(
                "INSERT INTO cart_lines (uuid, user_id, restaurant_id, dish_id, quantity, options)
                 VALUES ($1, $2, $3, $4, 1, $5)",
            )
            .bind(Uuid::now_v7())
            .bind(user)
            .bind(restaurant)
            .bind(dish)
            .bind(json!({}))
            .execute(&mut *tx)
            .await;

            if attempt == 0 {
                result.expect("first insert should succeed");
            } else {
                let error = result.expect_err("duplicate (user, dish) must fail");

                assert!(
                    matches!(
                        error.as_database_error().map(sqlx::error::DatabaseError::kind),
                        Some(sqlx::error::ErrorKind::UniqueViolation)
                    ),
                    "expected unique violation, got {error:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn schema_rejects_a_zero_quantity_line() {
        let db = TestDb::new().await;
        let mut tx = db.begin_test_transaction().await;

        let (restaurant, dish) = seed_catalog(&mut tx).await;

        let result = query(
            "INSERT INTO cart_lines (uuid, session_token, restaurant_id, dish_id, quantity, options)
             VALUES ($1, 'g1', $2, $3, 0, $4)",
        )
        .bind(Uuid::now_v7())
        .bind(restaurant)
        .bind(dish)
        .bind(json!({}))
        .execute(&mut *tx)
        .await;

        let error = result.expect_err("zero quantity must fail");

        assert!(
            matches!(
                error.as_database_error().map(sqlx::error::DatabaseError::kind),
                Some(sqlx::error::ErrorKind::CheckViolation)
            ),
            "expected check violation, got {error:?}"
        );
    }
}
