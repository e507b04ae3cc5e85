//! User account repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{User, UserRequest, UserRole};

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name")
            .fetch_all(self.pool)
            .await
            .context("Failed to list users")?;

        Ok(users)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .context("Failed to fetch user")?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await
            .context("Failed to fetch user by email")?;

        Ok(user)
    }

    pub async fn create(&self, req: &UserRequest) -> Result<User> {
        let now = Utc::now().to_rfc3339();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&req.email)
        .bind(&req.name)
        .bind(req.role.unwrap_or(UserRole::User).as_str())
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .context("Failed to create user")?;

        Ok(user)
    }

    pub async fn update(&self, id: i64, req: &UserRequest) -> Result<Option<User>> {
        let now = Utc::now().to_rfc3339();

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = ?, name = ?, role = COALESCE(?, role), updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&req.email)
        .bind(&req.name)
        .bind(req.role.map(|r| r.as_str().to_string()))
        .bind(&now)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to update user")?;

        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected() > 0)
    }
}
