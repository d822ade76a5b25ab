//! Cart persistence.

use kiosk_core::{CartId, ProductId, UserId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{Cart, CartItem, Product};

pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the user's cart, creating an empty one on first touch.
    ///
    /// The `ON CONFLICT` upsert makes this safe under concurrent first
    /// requests for the same user.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carts (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING *",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(cart)
    }

    /// Items in a cart alongside their products, oldest line first.
    pub async fn items_with_products(
        &self,
        cart_id: CartId,
    ) -> Result<Vec<(CartItem, Product)>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY created_at",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product =
                sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
                    .bind(item.product_id)
                    .fetch_optional(self.pool)
                    .await?
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "cart item {} references missing product {}",
                            item.id, item.product_id
                        ))
                    })?;
            lines.push((item, product));
        }
        Ok(lines)
    }

    /// Add a product to the cart. If the product is already present the
    /// quantities are merged rather than duplicating the line.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(
            "INSERT INTO cart_items (cart_id, product_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (cart_id, product_id)
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                           updated_at = now()
             RETURNING *",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;
        Ok(item)
    }

    /// Set a line's quantity directly. Lines are addressed by product,
    /// which the `(cart_id, product_id)` unique constraint makes exact.
    pub async fn update_item_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        sqlx::query_as::<_, CartItem>(
            "UPDATE cart_items SET quantity = $3, updated_at = now()
             WHERE cart_id = $1 AND product_id = $2
             RETURNING *",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
