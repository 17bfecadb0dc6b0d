//! Users repository for database operations

use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    i18n::{Locale, Message},
    models::user::{Role, User, UserRow},
};

/// User columns with role names aggregated from `user_roles`
const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.password, u.locale, u.is_active,
           u.first_name, u.last_name,
           COALESCE(
               array_agg(r.name::text ORDER BY r.name) FILTER (WHERE r.name IS NOT NULL),
               '{}'::text[]
           ) AS roles,
           u.created_at, u.updated_at
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

/// Postgres SQLSTATE `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation_code(code: Option<&str>) -> bool {
    code == Some(UNIQUE_VIOLATION)
}

/// A concurrent insert of the same username lost the race on `users.username`
fn username_conflict(err: sqlx::Error, username: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if is_unique_violation_code(db.code().as_deref()) => {
            AppError::Conflict(
                Message::new("error.user.already_registered").arg("username", username),
            )
        }
        other => AppError::Database(other),
    }
}

/// Fields of a user to insert
pub struct NewUser<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub locale: Locale,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound(Message::new("error.user.not_found").arg("user", id.simple()))
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{} WHERE u.id = $1 GROUP BY u.id",
            USER_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Get user by username (exact match)
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{} WHERE u.username = $1 GROUP BY u.id",
            USER_SELECT
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// All users, by username
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "{} GROUP BY u.id ORDER BY u.username",
            USER_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a user (no roles)
    pub async fn create(&self, conn: &mut PgConnection, user: &NewUser<'_>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password, locale, is_active, first_name, last_name)
            VALUES ($1, $2, $3, $4, TRUE, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.locale.as_str())
        .bind(user.first_name)
        .bind(user.last_name)
        .execute(&mut *conn)
        .await
        .map_err(|e| username_conflict(e, user.username))?;

        Ok(())
    }

    /// Make sure a role row exists
    pub async fn ensure_role(&self, conn: &mut PgConnection, role: Role) -> AppResult<()> {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role.as_str())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn grant_role(&self, conn: &mut PgConnection, user_id: Uuid, role: Role) -> AppResult<()> {
        self.ensure_role(conn, role).await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn revoke_role(&self, conn: &mut PgConnection, user_id: Uuid, role: Role) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1 AND role_id = (SELECT id FROM roles WHERE name = $2)
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn set_password(&self, conn: &mut PgConnection, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn set_locale(&self, conn: &mut PgConnection, user_id: Uuid, locale: Locale) -> AppResult<()> {
        sqlx::query("UPDATE users SET locale = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(locale.as_str())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
