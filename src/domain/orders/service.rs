//! Orders service.
//!
//! Checkout reads the cart inside one transaction, writes the order and
//! its invoice lines, commits, and only then asks the cart store to clear
//! the owner's cart — the "order created" event re-expressed as a direct
//! call.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{CartsService, models::CartLineView, repository::PgCartLinesRepository},
        orders::{
            errors::OrdersServiceError,
            models::{Order, OrderUuid},
            repository::PgOrdersRepository,
        },
        owners::Owner,
    },
};

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    cart_lines: PgCartLinesRepository,
    carts: Arc<dyn CartsService>,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, carts: Arc<dyn CartsService>) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            cart_lines: PgCartLinesRepository::new(),
            carts,
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.place_order",
        skip(self),
        fields(owner = %owner),
        err
    )]
    async fn place_order(&self, owner: Owner) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let items = self.cart_lines.list_cart(&mut tx, &owner).await?;

        let Some(first) = items.first() else {
            return Err(OrdersServiceError::EmptyCart);
        };

        // All lines share one restaurant; the cart store enforces that.
        let restaurant = first.line.restaurant_uuid;
        let total: u64 = items.iter().map(CartLineView::line_total).sum();

        let mut order = self
            .orders
            .create_order(&mut tx, OrderUuid::new(), &owner, restaurant, total)
            .await?;

        for item in &items {
            let line = self.orders.create_order_line(&mut tx, order.uuid, item).await?;

            order.lines.push(line);
        }

        tx.commit().await?;

        // The cart is cleared only once the order is durable. A failure
        // here leaves the order in place and the cart intact for the
        // caller to surface.
        self.carts
            .clear_owner(owner.user_uuid(), owner.session_token().cloned())
            .await
            .map_err(OrdersServiceError::CartClear)?;

        info!(order_uuid = %order.uuid, total, "placed order");

        Ok(order)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let mut order = self.orders.get_order(&mut tx, order).await?;
        let lines = self.orders.list_order_lines(&mut tx, order.uuid).await?;

        tx.commit().await?;

        order.lines = lines;

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Create an order from the owner's cart, then clear the cart.
    async fn place_order(&self, owner: Owner) -> Result<Order, OrdersServiceError>;

    /// Retrieve a single order with its lines.
    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::MockCartsService,
            owners::UserUuid,
        },
        test::{TestContext, helpers::{guest_owner, user_owner}},
    };

    use super::*;

    #[tokio::test]
    async fn placing_an_order_snapshots_the_cart_and_clears_it() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user_owner();

        let roma = ctx.create_restaurant("Roma").await;
        let carbonara = ctx.create_dish(roma, "Carbonara", 12_00).await;
        let tiramisu = ctx.create_dish(roma, "Tiramisu", 6_50).await;

        ctx.carts
            .set_quantity(owner.clone(), carbonara, 2, Some(json!({"cheese": "extra"})))
            .await?;
        ctx.carts
            .set_quantity(owner.clone(), tiramisu, 1, None)
            .await?;

        let order = ctx.orders.place_order(owner.clone()).await?;

        assert_eq!(order.owner, owner);
        assert_eq!(order.restaurant_uuid, roma);
        assert_eq!(order.total, 2 * 12_00 + 6_50);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].dish_name, "Carbonara");
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.lines[0].options, json!({"cheese": "extra"}));

        // Order creation is the event that empties the cart.
        assert!(ctx.carts.list_items(owner).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn a_guest_can_check_out() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = guest_owner("g-checkout");

        let roma = ctx.create_restaurant("Roma").await;
        let carbonara = ctx.create_dish(roma, "Carbonara", 12_00).await;

        ctx.carts
            .set_quantity(owner.clone(), carbonara, 1, None)
            .await?;

        let order = ctx.orders.place_order(owner.clone()).await?;

        assert_eq!(order.owner, owner);
        assert!(ctx.carts.list_items(owner).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn placing_an_order_with_an_empty_cart_fails() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.place_order(user_owner()).await;

        assert!(
            matches!(result, Err(OrdersServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_order_returns_the_stored_record() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user_owner();

        let roma = ctx.create_restaurant("Roma").await;
        let carbonara = ctx.create_dish(roma, "Carbonara", 12_00).await;

        ctx.carts
            .set_quantity(owner.clone(), carbonara, 3, None)
            .await?;

        let placed = ctx.orders.place_order(owner).await?;
        let fetched = ctx.orders.get_order(placed.uuid).await?;

        assert_eq!(fetched.uuid, placed.uuid);
        assert_eq!(fetched.total, placed.total);
        assert_eq!(fetched.lines.len(), 1);
        assert_eq!(fetched.lines[0].unit_price, 12_00);

        Ok(())
    }

    #[tokio::test]
    async fn get_order_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.get_order(OrderUuid::new()).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn checkout_hands_the_orders_owner_fields_to_the_cart_store() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let owner = Owner::User(user);

        let roma = ctx.create_restaurant("Roma").await;
        let carbonara = ctx.create_dish(roma, "Carbonara", 12_00).await;

        ctx.carts
            .set_quantity(owner.clone(), carbonara, 1, None)
            .await?;

        let mut carts = MockCartsService::new();

        carts
            .expect_clear_owner()
            .withf(move |user_id, session_token| {
                *user_id == Some(user) && session_token.is_none()
            })
            .once()
            .returning(|_, _| Ok(()));

        let orders = PgOrdersService::new(ctx.app_db(), Arc::new(carts));

        orders.place_order(owner).await?;

        Ok(())
    }
}
