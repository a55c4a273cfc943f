//! Static fallback catalog.
//!
//! Served whenever the live catalog is unreachable or empty, so the
//! presentation layer always has renderable content. The data is fixed and
//! deterministic; tests pin its shape.

use lumiere_core::{CategoryId, ImageId, ProductId};

use crate::commerce::types::{Category, CategoryRef, Product, ProductImage};

/// The fixed fallback product set.
#[must_use]
pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new(1),
            name: "Silk Radiance Foundation".to_string(),
            slug: "silk-radiance".to_string(),
            price: "55.00".into(),
            regular_price: "55.00".into(),
            sale_price: "".into(),
            description: "A weightless foundation for a natural glow.".to_string(),
            short_description: "Glowing skin foundation.".to_string(),
            images: vec![ProductImage {
                id: ImageId::new(101),
                src: "https://picsum.photos/seed/makeup1/600/800".to_string(),
                name: "foundation".to_string(),
            }],
            categories: vec![CategoryRef {
                id: CategoryId::new(10),
                name: "Makeup".to_string(),
                slug: "makeup".to_string(),
            }],
            stock_status: lumiere_core::StockStatus::InStock,
            average_rating: "4.8".to_string(),
            rating_count: 120,
        },
        Product {
            id: ProductId::new(2),
            name: "Velvet Rose Lipstick".to_string(),
            slug: "velvet-rose".to_string(),
            price: "28.00".into(),
            regular_price: "32.00".into(),
            sale_price: "28.00".into(),
            description: "Matte finish with long-lasting hydration.".to_string(),
            short_description: "Premium matte lipstick.".to_string(),
            images: vec![ProductImage {
                id: ImageId::new(102),
                src: "https://picsum.photos/seed/lipstick/600/800".to_string(),
                name: "lipstick".to_string(),
            }],
            categories: vec![CategoryRef {
                id: CategoryId::new(10),
                name: "Lipsticks".to_string(),
                slug: "lipsticks".to_string(),
            }],
            stock_status: lumiere_core::StockStatus::InStock,
            average_rating: "4.9".to_string(),
            rating_count: 85,
        },
        Product {
            id: ProductId::new(3),
            name: "Midnight Elixir Serum".to_string(),
            slug: "midnight-elixir".to_string(),
            price: "85.00".into(),
            regular_price: "85.00".into(),
            sale_price: "".into(),
            description: "Intense night repair serum for all skin types.".to_string(),
            short_description: "Night repair serum.".to_string(),
            images: vec![ProductImage {
                id: ImageId::new(103),
                src: "https://picsum.photos/seed/serum/600/800".to_string(),
                name: "serum".to_string(),
            }],
            categories: vec![CategoryRef {
                id: CategoryId::new(11),
                name: "Skincare".to_string(),
                slug: "skincare".to_string(),
            }],
            stock_status: lumiere_core::StockStatus::InStock,
            average_rating: "5.0".to_string(),
            rating_count: 210,
        },
    ]
}

/// Fallback for a single-product read: the matching fallback product when the
/// ID is in the set, otherwise the first one.
#[must_use]
pub fn product(id: ProductId) -> Product {
    let mut set = products();
    let position = set.iter().position(|p| p.id == id).unwrap_or(0);
    set.swap_remove(position)
}

/// The fixed fallback category list.
#[must_use]
pub fn categories() -> Vec<Category> {
    vec![
        Category {
            id: CategoryId::new(10),
            name: "Makeup".to_string(),
            slug: "makeup".to_string(),
            image: None,
            count: 20,
        },
        Category {
            id: CategoryId::new(11),
            name: "Skincare".to_string(),
            slug: "skincare".to_string(),
            image: None,
            count: 15,
        },
        Category {
            id: CategoryId::new(12),
            name: "Perfume".to_string(),
            slug: "perfume".to_string(),
            image: None,
            count: 8,
        },
        Category {
            id: CategoryId::new(13),
            name: "Tools".to_string(),
            slug: "tools".to_string(),
            image: None,
            count: 5,
        },
    ]
}
