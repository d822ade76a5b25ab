//! Seed the database with sample catalog data.
//!
//! Inserts a small category tree and a handful of products so a fresh
//! install has something to browse. Safe to re-run: seeding is skipped
//! when any of the sample categories already exists.

use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use kiosk_api::db::{self, CategoryRepository, ProductRepository, RepositoryError};
use kiosk_core::{CategoryId, slugify};

use super::admin::AdminError;

struct SampleProduct {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    sale_price: Option<Decimal>,
    stock: i32,
    sku: &'static str,
    featured: bool,
    category: &'static str,
}

fn sample_products() -> Vec<SampleProduct> {
    vec![
        SampleProduct {
            name: "Aurora Laptop 14",
            description: "Thin-and-light 14-inch laptop with a 10-core CPU.",
            price: Decimal::new(129_900, 2),
            sale_price: Some(Decimal::new(119_900, 2)),
            stock: 25,
            sku: "KSK-LAP-001",
            featured: true,
            category: "Laptops",
        },
        SampleProduct {
            name: "Pebble Phone X",
            description: "6.1-inch phone with a two-day battery.",
            price: Decimal::new(79_900, 2),
            sale_price: None,
            stock: 60,
            sku: "KSK-PHN-001",
            featured: true,
            category: "Phones",
        },
        SampleProduct {
            name: "Drift Wireless Earbuds",
            description: "Noise-cancelling earbuds with wireless charging case.",
            price: Decimal::new(14_900, 2),
            sale_price: Some(Decimal::new(9_900, 2)),
            stock: 200,
            sku: "KSK-AUD-001",
            featured: false,
            category: "Audio",
        },
        SampleProduct {
            name: "Summit Hoodie",
            description: "Heavyweight fleece hoodie, unisex fit.",
            price: Decimal::new(5_900, 2),
            sale_price: None,
            stock: 120,
            sku: "KSK-APP-001",
            featured: false,
            category: "Apparel",
        },
    ]
}

/// Seed sample categories and products.
///
/// # Errors
///
/// Returns `AdminError` when the database is unreachable or an insert fails.
pub async fn run() -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let database_url = super::migrate::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url)
        .await
        .map_err(RepositoryError::from)?;

    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    if categories.exists_by_name("Electronics").await? {
        info!("Sample data already present, nothing to do");
        return Ok(());
    }

    info!("Seeding categories...");
    let electronics = create_category(&categories, "Electronics", None).await?;
    let laptops = create_category(&categories, "Laptops", Some(electronics)).await?;
    let phones = create_category(&categories, "Phones", Some(electronics)).await?;
    let audio = create_category(&categories, "Audio", Some(electronics)).await?;
    let apparel = create_category(&categories, "Apparel", None).await?;

    let category_id = |name: &str| -> CategoryId {
        match name {
            "Laptops" => laptops,
            "Phones" => phones,
            "Audio" => audio,
            _ => apparel,
        }
    };

    info!("Seeding products...");
    let mut inserted = 0usize;
    for sample in sample_products() {
        let attributes = json!({ "seeded": true });
        products
            .create(
                sample.name,
                &slugify(sample.name),
                sample.description,
                sample.price,
                sample.sale_price,
                sample.stock,
                Some(sample.sku),
                &[],
                sample.featured,
                Some(&attributes),
                &[category_id(sample.category)],
            )
            .await?;
        inserted += 1;
    }

    info!("Seeding complete! 5 categories, {inserted} products");
    Ok(())
}

async fn create_category(
    repo: &CategoryRepository<'_>,
    name: &str,
    parent: Option<CategoryId>,
) -> Result<CategoryId, AdminError> {
    let category = repo
        .create(name, &slugify(name), None, None, true, parent)
        .await?;
    Ok(category.id)
}
