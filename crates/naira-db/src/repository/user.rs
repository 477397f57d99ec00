//! # User Repository
//!
//! Staff accounts. Passwords arrive here already hashed; hashing and
//! verification live in the server's auth module.
//!
//! Usernames are unique case-insensitively (`COLLATE NOCASE`).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{commit, DbError, DbResult};
use crate::repository::generate_id;
use naira_core::validation::{non_blank, validate_email, validate_text, validate_username};
use naira_core::{CoreError, NewUser, Role, User, ValidationError};

const USER_COLUMNS: &str =
    "id, username, full_name, email, password_hash, role, is_active, created_at, last_login";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a staff account.
    ///
    /// ## Arguments
    /// * `input` - `input.password` is ignored; validate it before hashing
    /// * `password_hash` - argon2 PHC string
    pub async fn create(&self, input: &NewUser, password_hash: &str) -> DbResult<User> {
        validate_username(&input.username)?;
        validate_text("full_name", &input.full_name, 100)?;
        let email = non_blank(&input.email);
        if let Some(email) = email {
            validate_email(email)?;
        }

        let user = User {
            id: generate_id(),
            username: input.username.trim().to_string(),
            full_name: input.full_name.trim().to_string(),
            email: email.map(str::to_string),
            password_hash: password_hash.to_string(),
            role: input.role,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, full_name, email, password_hash, role, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                ValidationError::duplicate("username", &user.username).into()
            }
            other => other,
        })?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get(&self, id: &str) -> DbResult<User> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Case-insensitive username lookup, used at login.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Activates or deactivates an account.
    ///
    /// Deactivating the last active admin fails with `LastAdmin`. The count
    /// and the update share a transaction that starts with the write, so two
    /// admins deactivating each other cannot both succeed.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<User> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE users SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        if !active {
            let admins_left: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM users WHERE role = ?1 AND is_active = 1",
            )
            .bind(Role::Admin)
            .fetch_one(&mut *tx)
            .await?;
            if admins_left == 0 {
                return Err(CoreError::LastAdmin.into());
            }
        }

        commit(tx).await?;

        info!(user_id = %id, active, "User active flag changed");
        self.get(id).await
    }

    pub async fn record_login(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_login = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, test_db};

    #[tokio::test]
    async fn test_create_and_find_case_insensitive() {
        let db = test_db().await;
        let user = seed_user(&db, "Amaka", Role::Cashier).await;

        let found = db.users().get_by_username("amaka").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, Role::Cashier);
        assert_eq!(found.password_hash, "$argon2id$test");
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = test_db().await;
        seed_user(&db, "musa", Role::Inventory).await;

        let input = NewUser {
            username: "MUSA".to_string(),
            full_name: "Musa Two".to_string(),
            email: None,
            password: "secret1".to_string(),
            role: Role::Cashier,
        };
        let err = db.users().create(&input, "hash").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn test_last_admin_cannot_be_deactivated() {
        let db = test_db().await;
        let admin = seed_user(&db, "admin", Role::Admin).await;
        let cashier = seed_user(&db, "cashier", Role::Cashier).await;

        assert!(matches!(
            db.users().set_active(&admin.id, false).await,
            Err(DbError::Rejected(CoreError::LastAdmin))
        ));
        assert!(db.users().get(&admin.id).await.unwrap().is_active);

        let cashier = db.users().set_active(&cashier.id, false).await.unwrap();
        assert!(!cashier.is_active);

        let second = seed_user(&db, "admin2", Role::Admin).await;
        assert!(!db.users().set_active(&admin.id, false).await.unwrap().is_active);
        assert!(matches!(
            db.users().set_active(&second.id, false).await,
            Err(DbError::Rejected(CoreError::LastAdmin))
        ));
    }

    #[tokio::test]
    async fn test_record_login() {
        let db = test_db().await;
        let user = seed_user(&db, "tope", Role::Cashier).await;
        assert!(user.last_login.is_none());

        db.users().record_login(&user.id).await.unwrap();
        assert!(db.users().get(&user.id).await.unwrap().last_login.is_some());
    }
}
