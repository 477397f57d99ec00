//! Fixtures shared by the repository tests.

use naira_core::{NewProduct, NewUser, Product, Role, User};

use crate::pool::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub async fn seed_user(db: &Database, username: &str, role: Role) -> User {
    let input = NewUser {
        username: username.to_string(),
        full_name: format!("{username} test"),
        email: None,
        password: "not-used".to_string(),
        role,
    };
    db.users().create(&input, "$argon2id$test").await.unwrap()
}

pub fn new_product(sku: &str, price_kobo: i64, stock: i64) -> NewProduct {
    NewProduct {
        sku: sku.to_string(),
        barcode: None,
        name: format!("Product {sku}"),
        description: None,
        category: Some("Provisions".to_string()),
        price_kobo,
        cost_price_kobo: None,
        stock_quantity: stock,
        reorder_level: Some(10),
    }
}

pub async fn seed_product(db: &Database, sku: &str, price_kobo: i64, stock: i64) -> Product {
    db.products()
        .create(&new_product(sku, price_kobo, stock), None)
        .await
        .unwrap()
}
