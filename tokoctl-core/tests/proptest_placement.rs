use proptest::prelude::*;
use tokoctl_core::models::NewProduct;
use tokoctl_core::{place_order, MemoryStore, OrderErrorKind, PlaceOrder};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime")
}

proptest! {
    /// Property: a request within stock succeeds, decrements stock and
    /// records one order priced at quantity * price
    #[test]
    fn prop_within_stock_succeeds(stock in 1i32..1_000, price in 0i64..10_000_000, pick in 0.0f64..1.0) {
        let quantity = 1 + ((stock - 1) as f64 * pick) as i32;
        let (order, remaining, orders) = runtime().block_on(async {
            let store = MemoryStore::new();
            let product = store.insert_product(NewProduct::new("Item", price, stock)).await.unwrap();
            let order = place_order(&store, PlaceOrder {
                user_id: 1,
                product_id: product.id,
                quantity: i64::from(quantity),
            }).await.unwrap();
            (order, store.product(product.id).await.unwrap().stock, store.orders().await.len())
        });

        prop_assert_eq!(remaining, stock - quantity);
        prop_assert_eq!(order.total_price, i64::from(quantity) * price);
        prop_assert_eq!(orders, 1);
    }

    /// Property: a request above stock fails without side effects
    #[test]
    fn prop_above_stock_fails(stock in 0i32..1_000, extra in 1i64..1_000) {
        let (kind, remaining, orders) = runtime().block_on(async {
            let store = MemoryStore::new();
            let product = store.insert_product(NewProduct::new("Item", 100, stock)).await.unwrap();
            let err = place_order(&store, PlaceOrder {
                user_id: 1,
                product_id: product.id,
                quantity: i64::from(stock) + extra,
            }).await.unwrap_err();
            (err.kind(), store.product(product.id).await.unwrap().stock, store.orders().await.len())
        });

        prop_assert_eq!(kind, OrderErrorKind::InsufficientStock);
        prop_assert_eq!(remaining, stock);
        prop_assert_eq!(orders, 0);
    }

    /// Property: non-positive quantities are rejected as invalid input
    #[test]
    fn prop_non_positive_quantity_rejected(quantity in i64::MIN..=0) {
        let kind = runtime().block_on(async {
            let store = MemoryStore::new();
            let product = store.insert_product(NewProduct::new("Item", 100, 10)).await.unwrap();
            place_order(&store, PlaceOrder { user_id: 1, product_id: product.id, quantity })
                .await
                .unwrap_err()
                .kind()
        });

        prop_assert_eq!(kind, OrderErrorKind::InvalidInput);
    }
}
