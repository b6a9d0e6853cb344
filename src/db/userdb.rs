// db/userdb.rs
use async_trait::async_trait;

use crate::{
    db::DBClient,
    dtos::pagination::PageRequest,
    models::usermodel::{User, UserRole},
};

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<i32>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn save_user<T: Into<String> + Send>(
        &self,
        username: T,
        email: T,
        phone: T,
        password_hash: T,
    ) -> Result<User, sqlx::Error>;

    async fn get_users(
        &self,
        role: Option<UserRole>,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), sqlx::Error>;

    async fn get_latest_users(&self, limit: i64) -> Result<Vec<User>, sqlx::Error>;

    async fn get_user_count(&self, role: Option<UserRole>) -> Result<i64, sqlx::Error>;

    async fn update_user_role(
        &self,
        user_id: i32,
        role: UserRole,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn update_user_active(
        &self,
        user_id: i32,
        is_active: bool,
    ) -> Result<Option<User>, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<i32>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT id, username, email, phone, password_hash, role, is_active, created_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT id, username, email, phone, password_hash, role, is_active, created_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        username: T,
        email: T,
        phone: T,
        password_hash: T,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, phone, password_hash, role, is_active, created_at
            "#,
        )
        .bind(username.into())
        .bind(email.into())
        .bind(phone.into())
        .bind(password_hash.into())
        .fetch_one(&self.pool)
        .await
    }

    async fn get_users(
        &self,
        role: Option<UserRole>,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, phone, password_hash, role, is_active, created_at
            FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(role)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = self.get_user_count(role).await?;

        Ok((users, total))
    }

    async fn get_latest_users(&self, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, phone, password_hash, role, is_active, created_at
            FROM users
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_user_count(&self, role: Option<UserRole>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE ($1::user_role IS NULL OR role = $1)",
        )
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_role(
        &self,
        user_id: i32,
        role: UserRole,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $1
            WHERE id = $2
            RETURNING id, username, email, phone, password_hash, role, is_active, created_at
            "#,
        )
        .bind(role)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_user_active(
        &self,
        user_id: i32,
        is_active: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = $1
            WHERE id = $2
            RETURNING id, username, email, phone, password_hash, role, is_active, created_at
            "#,
        )
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}
