//! # Customer Repository
//!
//! Customers are optional on a sale. Names are not unique; the till picks
//! one from a search.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use naira_core::validation::{non_blank, validate_new_customer};
use naira_core::{Customer, NewCustomer};

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(input)?;

        let customer = Customer {
            id: generate_id(),
            name: input.name.trim().to_string(),
            phone: non_blank(&input.phone).map(str::to_string),
            email: non_blank(&input.email).map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO customers (id, name, phone, email, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, email, created_at FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get(&self, id: &str) -> DbResult<Customer> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Customers by name, paged.
    pub async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, created_at
            FROM customers
            ORDER BY name, created_at
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Substring match on name, phone or email.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<Customer>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list(limit, 0).await;
        }

        let pattern = format!("%{}%", escape_like(query));
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, created_at
            FROM customers
            WHERE name LIKE ?1 ESCAPE '\' OR phone LIKE ?1 ESCAPE '\' OR email LIKE ?1 ESCAPE '\'
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use naira_core::CoreError;

    fn input(name: &str, phone: Option<&str>) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            phone: phone.map(str::to_string),
            email: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let created = db
            .customers()
            .create(&input("Chidi Okeke", Some("+234 803 000 0000")))
            .await
            .unwrap();
        assert!(created.email.is_none());

        let fetched = db.customers().get(&created.id).await.unwrap();
        assert_eq!(fetched.name, "Chidi Okeke");
        assert!(matches!(
            db.customers().get("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed() {
        let db = test_db().await;
        db.customers().create(&input("Bola", None)).await.unwrap();
        db.customers().create(&input("Bola", None)).await.unwrap();
        assert_eq!(db.customers().list(10, 0).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_by_name_or_phone() {
        let db = test_db().await;
        db.customers()
            .create(&input("Ngozi Eze", Some("08031112222")))
            .await
            .unwrap();
        db.customers().create(&input("Tunde Bakare", None)).await.unwrap();

        assert_eq!(db.customers().search("ngozi", 10).await.unwrap().len(), 1);
        assert_eq!(db.customers().search("1112", 10).await.unwrap().len(), 1);
        assert!(db.customers().search("%", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let db = test_db().await;
        let mut bad = input("Kemi", None);
        bad.email = Some("kemi-at-example".to_string());
        assert!(matches!(
            db.customers().create(&bad).await,
            Err(DbError::Rejected(CoreError::Validation(_)))
        ));
    }
}
