//! Address persistence.

use kiosk_core::{AddressId, UserId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Address;

pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(
            "SELECT * FROM addresses WHERE user_id = $1
             ORDER BY is_default DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    pub async fn get_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: UserId,
        street: &str,
        city: &str,
        state: &str,
        country: &str,
        zip_code: &str,
        is_default: bool,
    ) -> Result<Address, RepositoryError> {
        if is_default {
            self.clear_default(user_id).await?;
        }
        let address = sqlx::query_as::<_, Address>(
            "INSERT INTO addresses (user_id, street, city, state, country, zip_code, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(user_id)
        .bind(street)
        .bind(city)
        .bind(state)
        .bind(country)
        .bind(zip_code)
        .bind(is_default)
        .fetch_one(self.pool)
        .await?;
        Ok(address)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: AddressId,
        user_id: UserId,
        street: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        country: Option<&str>,
        zip_code: Option<&str>,
        is_default: Option<bool>,
    ) -> Result<Address, RepositoryError> {
        if is_default == Some(true) {
            self.clear_default(user_id).await?;
        }
        sqlx::query_as::<_, Address>(
            "UPDATE addresses SET
                street = COALESCE($3, street),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                country = COALESCE($6, country),
                zip_code = COALESCE($7, zip_code),
                is_default = COALESCE($8, is_default),
                updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(street)
        .bind(city)
        .bind(state)
        .bind(country)
        .bind(zip_code)
        .bind(is_default)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    pub async fn delete_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Unset the current default before flipping a new one on.
    async fn clear_default(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE addresses SET is_default = FALSE, updated_at = now()
             WHERE user_id = $1 AND is_default",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
