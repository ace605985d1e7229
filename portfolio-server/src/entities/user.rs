use std::future::Future;

use crate::entities::{SqliteStore, UserRecord, parse_timestamp};

pub trait UserStore: Send + Sync + 'static {
    /// Insert or update the user keyed by `clerk_user_id`. `created_at` of an
    /// existing row is preserved.
    fn upsert_user(&self, user: UserRecord) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    fn get_user(
        &self,
        clerk_user_id: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>, sqlx::Error>> + Send;

    fn list_users(&self) -> impl Future<Output = Result<Vec<UserRecord>, sqlx::Error>> + Send;
}

type UserRow = (String, String, String, String, String, String);

fn from_row((clerk_user_id, email, name, role, created_at, updated_at): UserRow) -> UserRecord {
    UserRecord {
        clerk_user_id,
        email,
        name,
        role,
        created_at: parse_timestamp(&created_at, "users.created_at"),
        updated_at: parse_timestamp(&updated_at, "users.updated_at"),
    }
}

impl UserStore for SqliteStore {
    async fn upsert_user(&self, user: UserRecord) -> Result<(), sqlx::Error> {
        let created_at = user.created_at.to_rfc3339();
        let updated_at = user.updated_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO users (clerk_user_id, email, name, role, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(clerk_user_id) DO UPDATE SET \
                email = ?2, name = ?3, role = ?4, updated_at = ?6",
        )
        .bind(&user.clerk_user_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.role)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, clerk_user_id: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT clerk_user_id, email, name, role, created_at, updated_at \
             FROM users WHERE clerk_user_id = ?1",
        )
        .bind(clerk_user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, sqlx::Error> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT clerk_user_id, email, name, role, created_at, updated_at \
             FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }
}
