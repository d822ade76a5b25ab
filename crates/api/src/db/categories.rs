//! Category persistence, including closure-table maintenance.
//!
//! The tree is stored twice: an adjacency `parent_id` column for cheap
//! direct-child lookups, and a `category_closure` table holding every
//! (ancestor, descendant, depth) pair for subtree queries. Both are kept
//! in step inside transactions here.

use kiosk_core::CategoryId;
use sqlx::PgPool;

use super::{RepositoryError, conflict_on_unique};
use crate::models::Category;

pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: CategoryId) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// All categories, oldest first. Tree assembly happens in the service.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY created_at")
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Active categories ordered by name, for the flat listing.
    pub async fn list_active(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE is_active ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)")
                .bind(name)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a category and its closure rows in one transaction.
    ///
    /// The new node gets a depth-0 self link, plus one link per ancestor
    /// of the parent (depth bumped by one).
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
        image_url: Option<&str>,
        is_active: bool,
        parent_id: Option<CategoryId>,
    ) -> Result<Category, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug, description, image_url, is_active, parent_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(image_url)
        .bind(is_active)
        .bind(parent_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "category slug already in use"))?;

        sqlx::query(
            "INSERT INTO category_closure (ancestor_id, descendant_id, depth)
             VALUES ($1, $1, 0)",
        )
        .bind(category.id)
        .execute(&mut *tx)
        .await?;

        if let Some(parent) = parent_id {
            sqlx::query(
                "INSERT INTO category_closure (ancestor_id, descendant_id, depth)
                 SELECT ancestor_id, $1, depth + 1
                 FROM category_closure
                 WHERE descendant_id = $2",
            )
            .bind(category.id)
            .bind(parent)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(category)
    }

    /// Update scalar fields without touching the tree position.
    pub async fn update_fields(
        &self,
        id: CategoryId,
        name: Option<&str>,
        slug: Option<&str>,
        description: Option<&str>,
        image_url: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url),
                is_active = COALESCE($6, is_active),
                updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(image_url)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category slug already in use"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Move a subtree under a new parent (or to the root when `None`).
    ///
    /// Removes every closure link connecting a node inside the subtree to
    /// an ancestor outside it, then cross-joins the new parent's ancestor
    /// set with the subtree to rebuild them.
    pub async fn reparent(
        &self,
        id: CategoryId,
        new_parent: Option<CategoryId>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE categories SET parent_id = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(new_parent)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "DELETE FROM category_closure
             WHERE descendant_id IN (
                 SELECT descendant_id FROM category_closure WHERE ancestor_id = $1
             )
             AND ancestor_id NOT IN (
                 SELECT descendant_id FROM category_closure WHERE ancestor_id = $1
             )",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(parent) = new_parent {
            sqlx::query(
                "INSERT INTO category_closure (ancestor_id, descendant_id, depth)
                 SELECT up.ancestor_id, down.descendant_id,
                        up.depth + down.depth + 1
                 FROM category_closure AS up
                 CROSS JOIN category_closure AS down
                 WHERE up.descendant_id = $1 AND down.ancestor_id = $2",
            )
            .bind(parent)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a category. Children and closure rows go with it via
    /// `ON DELETE CASCADE`.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Strict descendants of `id` (the node itself excluded), nearest
    /// first.
    pub async fn find_descendants(&self, id: CategoryId) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT c.* FROM categories c
             JOIN category_closure cc ON cc.descendant_id = c.id
             WHERE cc.ancestor_id = $1 AND cc.depth >= 1
             ORDER BY cc.depth, c.created_at",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Ids of every category in the subtree rooted at `id`, root included.
    pub async fn descendant_ids(&self, id: CategoryId) -> Result<Vec<CategoryId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, CategoryId>(
            "SELECT descendant_id FROM category_closure WHERE ancestor_id = $1",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }
}
