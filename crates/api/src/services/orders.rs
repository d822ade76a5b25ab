//! Order pricing rules.

use rust_decimal::Decimal;

use crate::db::orders::NewOrderItem;
use crate::models::Product;

/// The price a unit sells for right now: the sale price when one is set,
/// the regular price otherwise.
#[must_use]
pub fn unit_price(product: &Product) -> Decimal {
    product.sale_price.unwrap_or(product.price)
}

/// Sum of `price * quantity` across all lines.
#[must_use]
pub fn order_total(items: &[NewOrderItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kiosk_core::ProductId;

    fn product(price: Decimal, sale_price: Option<Decimal>) -> Product {
        Product {
            id: ProductId::generate(),
            name: "widget".to_string(),
            slug: "widget".to_string(),
            description: None,
            price,
            sale_price,
            stock: 10,
            is_active: true,
            is_featured: false,
            image_urls: Vec::new(),
            attributes: None,
            sku: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sale_price_wins_when_set() {
        let p = product(Decimal::new(2000, 2), Some(Decimal::new(1500, 2)));
        assert_eq!(unit_price(&p), Decimal::new(1500, 2));
    }

    #[test]
    fn test_regular_price_without_sale() {
        let p = product(Decimal::new(2000, 2), None);
        assert_eq!(unit_price(&p), Decimal::new(2000, 2));
    }

    #[test]
    fn test_total_sums_lines() {
        let items = vec![
            NewOrderItem {
                product_id: ProductId::generate(),
                quantity: 2,
                price: Decimal::new(1999, 2),
            },
            NewOrderItem {
                product_id: ProductId::generate(),
                quantity: 1,
                price: Decimal::new(500, 2),
            },
        ];
        assert_eq!(order_total(&items), Decimal::new(4498, 2));
    }

    #[test]
    fn test_empty_order_totals_zero() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }
}
