//! Carts service.
//!
//! Every operation takes an explicit [`Owner`] resolved once per request.
//! Mutations run inside a single transaction; `set_quantity` locks the
//! candidate line before deciding insert/update/delete so two concurrent
//! quantity changes on the same (owner, dish) pair cannot lose an update.

use std::collections::HashSet;

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{CartChange, CartLineView},
            repository::PgCartLinesRepository,
        },
        catalog::{models::DishUuid, repository::PgDishesRepository},
        owners::{Owner, OwnerUnresolved, SessionToken, UserUuid},
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    lines: PgCartLinesRepository,
    dishes: PgDishesRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            lines: PgCartLinesRepository::new(),
            dishes: PgDishesRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn list_items(&self, owner: Owner) -> Result<Vec<CartLineView>, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let items = self.lines.list_cart(&mut tx, &owner).await?;

        tx.commit().await?;

        Ok(items)
    }

    #[tracing::instrument(
        name = "carts.service.set_quantity",
        skip(self, options),
        fields(owner = %owner, dish_uuid = %dish, quantity),
        err
    )]
    async fn set_quantity(
        &self,
        owner: Owner,
        dish: DishUuid,
        quantity: i64,
        options: Option<Value>,
    ) -> Result<CartChange, CartsServiceError> {
        if quantity < 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        let dish = self.dishes.get_dish(&mut tx, dish).await?;

        // Single restaurant per cart: adding from a second restaurant is a
        // conflict the caller resolves by clearing the cart first.
        if let Some(restaurant) = self.lines.cart_restaurant(&mut tx, &owner).await?
            && restaurant != dish.restaurant_uuid
        {
            return Err(CartsServiceError::RestaurantConflict);
        }

        let existing = self.lines.lock_line(&mut tx, &owner, dish.uuid).await?;

        let change = if quantity == 0 {
            // Removal is idempotent; deleting an absent line is not an error.
            if let Some(line) = existing {
                self.lines.delete_line(&mut tx, line.uuid).await?;
            }

            CartChange::Removed
        } else {
            let line = self
                .lines
                .upsert_line(
                    &mut tx,
                    &owner,
                    dish.restaurant_uuid,
                    dish.uuid,
                    quantity,
                    options.as_ref(),
                )
                .await?;

            CartChange::Updated(line)
        };

        tx.commit().await?;

        info!(dish_uuid = %dish.uuid, quantity, "set cart quantity");

        Ok(change)
    }

    #[tracing::instrument(name = "carts.service.clear", skip(self), fields(owner = %owner), err)]
    async fn clear(&self, owner: Owner) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let removed = self.lines.clear_cart(&mut tx, &owner).await?;

        tx.commit().await?;

        info!(removed, "cleared cart");

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.migrate_guest_cart_to_user",
        skip(self, token),
        fields(user_uuid = %user),
        err
    )]
    async fn migrate_guest_cart_to_user(
        &self,
        token: SessionToken,
        user: UserUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        // Guest lines drive the merge, in their original insertion order.
        let guest_lines = self.lines.guest_lines_for_update(&mut tx, &token).await?;

        if guest_lines.is_empty() {
            tx.commit().await?;

            return Ok(());
        }

        let mut user_lines = self.lines.user_lines_for_update(&mut tx, user).await?;

        // Dishes currently holding a row under the guest token. A demotion
        // must not collide with one of these on the (token, dish) key.
        let mut guest_dishes: HashSet<DishUuid> =
            guest_lines.iter().map(|line| line.dish_uuid).collect();

        for guest_line in guest_lines {
            // The user's line for the same dish at a different restaurant
            // cannot coexist with the incoming line; drop it.
            if let Some(pos) = user_lines.iter().position(|line| {
                line.dish_uuid == guest_line.dish_uuid
                    && line.restaurant_uuid != guest_line.restaurant_uuid
            }) {
                let conflicting = user_lines.remove(pos);

                self.lines.delete_line(&mut tx, conflicting.uuid).await?;
            }

            // Any remaining user line from another restaurant is handed back
            // to the guest session rather than destroyed, so it survives as
            // an anonymous cart. When the token already holds that dish the
            // demotion would collide, and the user line is dropped instead.
            for leftover in std::mem::take(&mut user_lines) {
                if leftover.restaurant_uuid == guest_line.restaurant_uuid {
                    user_lines.push(leftover);
                } else if guest_dishes.contains(&leftover.dish_uuid) {
                    self.lines.delete_line(&mut tx, leftover.uuid).await?;
                } else {
                    self.lines.demote_line(&mut tx, leftover.uuid, &token).await?;

                    guest_dishes.insert(leftover.dish_uuid);
                }
            }

            // Merge into the surviving same-restaurant line, or hand the
            // guest line itself to the user.
            if let Some(existing) = user_lines
                .iter_mut()
                .find(|line| line.dish_uuid == guest_line.dish_uuid)
            {
                let add = i64::try_from(guest_line.quantity)
                    .map_err(|_| CartsServiceError::InvalidData)?;

                self.lines
                    .merge_line(&mut tx, existing.uuid, add, &guest_line.options)
                    .await?;

                existing.quantity += guest_line.quantity;
                existing.options = guest_line.options.clone();

                self.lines.delete_line(&mut tx, guest_line.uuid).await?;
                guest_dishes.remove(&guest_line.dish_uuid);
            } else {
                self.lines.assign_line(&mut tx, guest_line.uuid, user).await?;
                guest_dishes.remove(&guest_line.dish_uuid);

                let mut line = guest_line;
                line.owner = Owner::User(user);
                user_lines.push(line);
            }
        }

        tx.commit().await?;

        info!("migrated guest cart to user");

        Ok(())
    }

    async fn clear_owner(
        &self,
        user_id: Option<UserUuid>,
        session_token: Option<SessionToken>,
    ) -> Result<(), CartsServiceError> {
        let token = session_token.as_ref().map(SessionToken::as_str);

        match Owner::resolve(user_id, token) {
            Ok(owner) => self.clear(owner).await,
            // The order carried no cart context; nothing to clear.
            Err(OwnerUnresolved) => Ok(()),
        }
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// All lines for the owner joined with dish and restaurant summaries,
    /// oldest first.
    async fn list_items(&self, owner: Owner) -> Result<Vec<CartLineView>, CartsServiceError>;

    /// Set the owner's quantity for a dish. Zero removes the line; a fresh
    /// positive quantity creates it. `options = None` preserves stored
    /// options, `Some` overwrites them.
    async fn set_quantity(
        &self,
        owner: Owner,
        dish: DishUuid,
        quantity: i64,
        options: Option<Value>,
    ) -> Result<CartChange, CartsServiceError>;

    /// Delete all of the owner's lines.
    async fn clear(&self, owner: Owner) -> Result<(), CartsServiceError>;

    /// Fold the anonymous cart under `token` into the user's cart, in a
    /// single atomic transaction. A second call with an already-empty guest
    /// cart is a no-op.
    async fn migrate_guest_cart_to_user(
        &self,
        token: SessionToken,
        user: UserUuid,
    ) -> Result<(), CartsServiceError>;

    /// Order-lifecycle entry point: clear the cart an order was created
    /// from, given the order's raw owner fields. Unresolvable owner fields
    /// are a no-op.
    async fn clear_owner(
        &self,
        user_id: Option<UserUuid>,
        session_token: Option<SessionToken>,
    ) -> Result<(), CartsServiceError>;
}
