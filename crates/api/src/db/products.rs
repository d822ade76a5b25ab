//! Product persistence.

use kiosk_core::{CategoryId, ProductId};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{Category, Product};

/// Whitelisted sort fields for the product listing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Name,
    Price,
    #[default]
    CreatedAt,
    Stock,
}

impl ProductSort {
    const fn column(self) -> &'static str {
        match self {
            Self::Name => "p.name",
            Self::Price => "p.price",
            Self::CreatedAt => "p.created_at",
            Self::Stock => "p.stock",
        }
    }
}

/// Filter set for the product listing query.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    /// Restrict to products directly linked to this category.
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring match against name and description.
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_featured: Option<bool>,
    /// When unset, only active products are returned.
    pub include_inactive: bool,
    pub sort: ProductSort,
    /// Ascending order; descending is the default.
    pub ascending: bool,
}

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Paginated, filtered listing. Returns the page plus the total count
    /// matching the filter.
    pub async fn find_all(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT p.* FROM products p");
        let mut count = QueryBuilder::<Postgres>::new("SELECT count(*) FROM products p");

        for builder in [&mut query, &mut count] {
            Self::push_filter(builder, filter);
        }

        query.push(" ORDER BY ");
        query.push(filter.sort.column());
        query.push(if filter.ascending { " ASC" } else { " DESC" });
        query.push(" LIMIT ").push_bind(limit);
        query.push(" OFFSET ").push_bind(offset);

        let items = query
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;
        Ok((items, total))
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
        if let Some(category_id) = filter.category_id {
            builder.push(
                " JOIN product_categories pc ON pc.product_id = p.id AND pc.category_id = ",
            );
            builder.push_bind(category_id);
        }
        builder.push(" WHERE TRUE");
        if !filter.include_inactive {
            builder.push(" AND p.is_active");
        }
        if let Some(ref search) = filter.search {
            builder.push(" AND (p.name ILIKE ");
            builder.push_bind(format!("%{search}%"));
            builder.push(" OR p.description ILIKE ");
            builder.push_bind(format!("%{search}%"));
            builder.push(")");
        }
        if let Some(min) = filter.min_price {
            builder.push(" AND p.price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            builder.push(" AND p.price <= ").push_bind(max);
        }
        if let Some(featured) = filter.is_featured {
            builder.push(" AND p.is_featured = ").push_bind(featured);
        }
    }

    /// Active featured products, newest first.
    pub async fn find_featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(
            "SELECT * FROM products
             WHERE is_featured AND is_active
             ORDER BY created_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Active products linked to any of the given categories. Callers pass
    /// a whole subtree's ids to get descendant expansion.
    pub async fn find_by_categories(
        &self,
        category_ids: &[CategoryId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<::uuid::Uuid> = category_ids.iter().map(|c| (*c).into()).collect();
        let rows = sqlx::query_as::<_, Product>(
            "SELECT DISTINCT p.* FROM products p
             JOIN product_categories pc ON pc.product_id = p.id
             WHERE pc.category_id = ANY($1) AND p.is_active
             ORDER BY p.created_at DESC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Categories a product is linked to.
    pub async fn categories_of(&self, id: ProductId) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT c.* FROM categories c
             JOIN product_categories pc ON pc.category_id = c.id
             WHERE pc.product_id = $1
             ORDER BY c.name",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        description: &str,
        price: Decimal,
        sale_price: Option<Decimal>,
        stock: i32,
        sku: Option<&str>,
        image_urls: &[String],
        is_featured: bool,
        attributes: Option<&serde_json::Value>,
        category_ids: &[CategoryId],
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products
                 (name, slug, description, price, sale_price, stock, sku,
                  image_urls, is_featured, attributes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(price)
        .bind(sale_price)
        .bind(stock)
        .bind(sku)
        .bind(image_urls)
        .bind(is_featured)
        .bind(attributes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "product name or slug already in use"))?;

        for category_id in category_ids {
            sqlx::query(
                "INSERT INTO product_categories (product_id, category_id)
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(product.id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(product)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: ProductId,
        name: Option<&str>,
        slug: Option<&str>,
        description: Option<&str>,
        price: Option<Decimal>,
        sale_price: Option<Decimal>,
        stock: Option<i32>,
        sku: Option<&str>,
        image_urls: Option<&[String]>,
        is_featured: Option<bool>,
        is_active: Option<bool>,
        attributes: Option<&serde_json::Value>,
        category_ids: Option<&[CategoryId]>,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                sale_price = COALESCE($6, sale_price),
                stock = COALESCE($7, stock),
                sku = COALESCE($8, sku),
                image_urls = COALESCE($9, image_urls),
                is_featured = COALESCE($10, is_featured),
                is_active = COALESCE($11, is_active),
                attributes = COALESCE($12, attributes),
                updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(price)
        .bind(sale_price)
        .bind(stock)
        .bind(sku)
        .bind(image_urls)
        .bind(is_featured)
        .bind(is_active)
        .bind(attributes)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "product name or slug already in use"))?
        .ok_or(RepositoryError::NotFound)?;

        // A provided category list replaces the whole set.
        if let Some(ids) = category_ids {
            sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for category_id in ids {
                sqlx::query(
                    "INSERT INTO product_categories (product_id, category_id)
                     VALUES ($1, $2) ON CONFLICT DO NOTHING",
                )
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(product)
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
