//! # User Repository
//!
//! Dashboard accounts. Emails are unique; passwords are stored as argon2
//! hashes and only ever compared through [`crate::password`].

use chrono::Utc;
use sqlx::SqlitePool;
use stockroom_core::forms::{AccountUpdate, Credentials};
use stockroom_core::User;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::password;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<User> {
        debug!(id = %id, "Getting user");
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Creates an account. A taken email surfaces as a unique violation on `email`.
    pub async fn create(&self, credentials: &Credentials) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: credentials.email.clone(),
            password_hash: password::hash(credentials.password.clone()).await?,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;

        info!(id = %user.id, "User created");
        Ok(user)
    }

    /// Checks credentials. Unknown email and wrong password both yield `None`.
    pub async fn authenticate(&self, credentials: &Credentials) -> DbResult<Option<User>> {
        let Some(user) = self.find_by_email(&credentials.email).await? else {
            debug!("Sign-in for unknown email");
            return Ok(None);
        };

        let matches =
            password::verify(credentials.password.clone(), user.password_hash.clone()).await?;
        if matches {
            Ok(Some(user))
        } else {
            debug!(id = %user.id, "Sign-in with wrong password");
            Ok(None)
        }
    }

    /// Applies an account change after checking the current password.
    ///
    /// ## Returns
    /// `Ok(None)` when the current password doesn't match.
    pub async fn update_account(
        &self,
        id: &str,
        update: &AccountUpdate,
    ) -> DbResult<Option<User>> {
        let mut user = self.get(id).await?;
        let current = update.current_password.clone();
        if !password::verify(current, user.password_hash.clone()).await? {
            return Ok(None);
        }

        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        if let Some(new_password) = &update.new_password {
            user.password_hash = password::hash(new_password.clone()).await?;
        }

        sqlx::query("UPDATE users SET email = ?, password_hash = ? WHERE id = ?")
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(
            id = %id,
            email_changed = update.email.is_some(),
            password_changed = update.new_password.is_some(),
            "User updated"
        );
        Ok(Some(user))
    }

    /// Deletes an account. Accounts that created orders are kept by the
    /// foreign key.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        info!(id = %id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let created = db
            .users()
            .create(&credentials("dat@example.com", "pa55word!"))
            .await
            .unwrap();
        assert_ne!(created.password_hash, "pa55word!");

        let found = db
            .users()
            .authenticate(&credentials("dat@example.com", "pa55word!"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);

        assert!(db
            .users()
            .authenticate(&credentials("dat@example.com", "wrong-pa55!"))
            .await
            .unwrap()
            .is_none());
        assert!(db
            .users()
            .authenticate(&credentials("nobody@example.com", "pa55word!"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().create(&credentials("dat@example.com", "pa55word!")).await.unwrap();

        let err = db
            .users()
            .create(&credentials("dat@example.com", "other-pa55!"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field } if field == "email"));
    }

    #[tokio::test]
    async fn test_update_requires_current_password() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create(&credentials("dat@example.com", "pa55word!")).await.unwrap();

        let change = AccountUpdate {
            email: Some("new@example.com".to_string()),
            current_password: "not-it-1!".to_string(),
            new_password: None,
        };
        assert!(db.users().update_account(&user.id, &change).await.unwrap().is_none());

        let change = AccountUpdate {
            email: None,
            current_password: "pa55word!".to_string(),
            new_password: Some("n3w-pa55word".to_string()),
        };
        let updated = db.users().update_account(&user.id, &change).await.unwrap().unwrap();
        assert_eq!(updated.email, "dat@example.com");

        assert!(db
            .users()
            .authenticate(&credentials("dat@example.com", "n3w-pa55word"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create(&credentials("dat@example.com", "pa55word!")).await.unwrap();

        db.users().delete(&user.id).await.unwrap();
        assert!(matches!(db.users().get(&user.id).await, Err(DbError::NotFound { .. })));
        assert!(matches!(db.users().delete(&user.id).await, Err(DbError::NotFound { .. })));
    }
}
