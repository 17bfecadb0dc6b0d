//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;
use crate::{error::AppError, i18n::{Locale, Message}};

/// Named permission groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Admin,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Agent => "Agent",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Internal row structure, roles aggregated from `user_roles`
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    id: Uuid,
    username: String,
    password: String,
    locale: String,
    is_active: bool,
    first_name: String,
    last_name: String,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password: row.password,
            locale: row.locale.parse().unwrap_or_default(),
            active: row.is_active,
            first_name: row.first_name,
            last_name: row.last_name,
            roles: row.roles,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Full user model
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub locale: Locale,
    pub active: bool,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User list entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserShort {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub locale: Locale,
    /// Language name in the caller's locale
    pub locale_label: String,
}

/// Registration form (admin) and first-administrator form (bootstrap)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(
        length(min = 1, max = 80, code = "error.form.length"),
        custom(function = "not_blank")
    )]
    pub username: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub language: Locale,
    #[validate(length(max = 50, code = "error.form.length"))]
    pub first_name: Option<String>,
    #[validate(length(max = 50, code = "error.form.length"))]
    pub last_name: Option<String>,
}

/// A user editing their own account
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelfEdit {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
    pub language: Locale,
}

impl SelfEdit {
    /// New password to set, if any. Fails when the confirmation differs.
    pub fn requested_password(&self) -> Result<Option<&str>, AppError> {
        let new = self.new_password.as_deref().unwrap_or("");
        let confirm = self.confirm_password.as_deref().unwrap_or("");
        if new != confirm {
            return Err(AppError::Validation(Message::new("error.form.passwords_mismatch")));
        }
        Ok(Some(new).filter(|p| !p.is_empty()))
    }
}

/// An administrator editing another account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminEdit {
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Username
    pub sub: String,
    pub user_id: Uuid,
    pub roles: Vec<String>,
    pub locale: Locale,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn for_user(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            roles: user.roles.clone(),
            locale: user.locale,
            exp: now + (expiration_hours as i64 * 3600),
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn username(&self) -> &str {
        &self.sub
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}
