//! Database row structs and JSON response shapes.
//!
//! Row structs derive `sqlx::FromRow` and serialize with camelCase
//! field names, so most of them double as API responses. Composite
//! shapes (cart with products, order with items, category trees) live
//! next to their row struct.

pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use address::Address;
pub use cart::{Cart, CartItem, CartLine, CartView};
pub use category::{Category, CategoryTree};
pub use order::{Order, OrderItem, OrderView};
pub use product::{Page, Product, ProductWithCategories};
pub use review::Review;
pub use user::User;
