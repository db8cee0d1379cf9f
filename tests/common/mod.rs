#![allow(dead_code)]

use order_fulfillment::lifecycle::config::{
    DirectoryConfig, FulfillmentConfig, PointConfig, ProductSeed, ProductSupplier,
};
use order_fulfillment::model::{CartItem, CheckoutRequest, DeliveryPartner, ProductId, ShippingAddress};
use rust_decimal::Decimal;

pub const STRIPE_SECRET: &str = "whsec_integration";

/// Product 1: cold-chain item, 5 in stock. Product 2: 100 in stock. Product 3: no supplier.
pub fn test_config() -> FulfillmentConfig {
    let mut config = FulfillmentConfig::default();
    config.inventory.products = vec![
        ProductSeed {
            id: 1,
            name: "Vaccine cooler".into(),
            stock: 5,
        },
        ProductSeed {
            id: 2,
            name: "Ice pack".into(),
            stock: 100,
        },
        ProductSeed {
            id: 3,
            name: "Orphan".into(),
            stock: 10,
        },
    ];
    config.directory = DirectoryConfig {
        hubs: vec![PointConfig {
            id: "hub-paris".into(),
            name: "Paris Hub".into(),
            lat: 48.8566,
            lng: 2.3522,
        }],
        suppliers: vec![PointConfig {
            id: "sup-lille".into(),
            name: "Lille Supplier".into(),
            lat: 50.6292,
            lng: 3.0573,
        }],
        product_suppliers: vec![
            ProductSupplier {
                product_id: 1,
                supplier_id: "sup-lille".into(),
            },
            ProductSupplier {
                product_id: 2,
                supplier_id: "sup-lille".into(),
            },
        ],
    };
    config.routing.partners = vec![DeliveryPartner {
        id: "swift".into(),
        name: "Swift Couriers".into(),
        max_route_km: None,
    }];
    config.payments.stripe_webhook_secret = Some(STRIPE_SECRET.into());
    config
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        recipient: Some("Alice".into()),
        line1: "1 Rue de Rivoli".into(),
        city: "Paris".into(),
        postal_code: "75001".into(),
        country: "FR".into(),
        lat: 48.8606,
        lng: 2.3376,
    }
}

/// Cart of `(product, quantity)` at 10.00 per unit.
pub fn checkout_request(items: &[(u32, i64)]) -> CheckoutRequest {
    CheckoutRequest {
        cart_items: items
            .iter()
            .map(|&(product, quantity)| CartItem {
                product_id: ProductId(product),
                quantity,
                price_at_purchase: Decimal::new(1000, 2),
            })
            .collect(),
        shipping_address: address(),
        customer: Some("alice@example.com".into()),
        shipping_price: Decimal::new(499, 2),
    }
}
