//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use barcoders::{generators::svg::SVG, sym::code128::Code128};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{AuthConfig, BootstrapConfig},
    error::{AppError, AppResult},
    i18n::{Locale, Localizer, Message},
    models::user::{AdminEdit, CreateUser, Role, SelfEdit, User, UserClaims, UserShort},
    repository::{users::NewUser, Repository},
};

/// Accounts created at startup when `bootstrap.seed_default_users` is set
const DEFAULT_ACCOUNTS: &[(&str, &[Role])] = &[("user", &[]), ("admin", &[Role::Admin, Role::Agent])];

/// Bar height of the rendered badge, in pixels
const BARCODE_HEIGHT: u32 = 80;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    /// Authenticate by username and password, returning a JWT and the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&user.password, password)? {
            tracing::warn!(username, "Login failed");
            return Err(invalid_credentials());
        }

        self.issue_token(user)
    }

    /// Badge login: the user's id is the credential
    pub async fn authenticate_uuid(&self, id: Uuid) -> AppResult<(String, User)> {
        if !self.config.allow_uuid_login {
            return Err(AppError::Authentication(Message::new(
                "error.auth.uuid_login_disabled",
            )));
        }

        let user = self
            .repository
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(invalid_credentials)?;

        self.issue_token(user)
    }

    fn issue_token(&self, user: User) -> AppResult<(String, User)> {
        if !user.active {
            return Err(AppError::Authentication(Message::new("error.auth.inactive")));
        }

        let token = UserClaims::for_user(&user, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!(username = %user.username, "User logged in");
        Ok((token, user))
    }

    /// Validate a bearer token
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AppError::Authentication(Message::new("error.auth.invalid_token"))
        })
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// All users, with language labels in `locale`
    pub async fn list(&self, localizer: &dyn Localizer, locale: Locale) -> AppResult<Vec<UserShort>> {
        let users = self.repository.users.list().await?;
        Ok(users
            .into_iter()
            .map(|user| UserShort {
                locale_label: localizer.t(locale, user.locale.label_key(), &[]),
                id: user.id,
                username: user.username,
                roles: user.roles,
                locale: user.locale,
            })
            .collect())
    }

    /// Register a new account (admin)
    pub async fn register(&self, form: CreateUser) -> AppResult<User> {
        form.validate()?;

        let username = form.username.trim();
        if self.repository.users.username_exists(username).await? {
            return Err(AppError::Conflict(
                Message::new("error.user.already_registered").arg("username", username),
            ));
        }

        let roles: &[Role] = if form.admin { &[Role::Admin] } else { &[] };
        let user = self.create_account(&form, roles).await?;
        tracing::info!(username = %user.username, admin = form.admin, "User registered");
        Ok(user)
    }

    /// Create the first administrator. Only allowed while no user exists.
    pub async fn init_admin(&self, form: CreateUser) -> AppResult<User> {
        form.validate()?;

        if self.repository.users.count().await? > 0 {
            return Err(AppError::Conflict(Message::new("error.user.init_done")));
        }

        let user = self
            .create_account(&form, &[Role::Admin, Role::Agent])
            .await?;
        tracing::info!(username = %user.username, "First administrator created");
        Ok(user)
    }

    async fn create_account(&self, form: &CreateUser, roles: &[Role]) -> AppResult<User> {
        let id = Uuid::new_v4();
        let password_hash = hash_password(&form.password)?;

        let mut uow = self.repository.begin().await?;
        self.repository
            .users
            .create(
                uow.conn(),
                &NewUser {
                    id,
                    username: form.username.trim(),
                    password_hash: &password_hash,
                    locale: form.language,
                    first_name: form.first_name.as_deref().unwrap_or(""),
                    last_name: form.last_name.as_deref().unwrap_or(""),
                },
            )
            .await?;
        for role in roles {
            self.repository.users.grant_role(uow.conn(), id, *role).await?;
        }
        uow.commit().await?;

        self.repository.users.get_by_id(id).await
    }

    /// A user changes their own language and, optionally, password.
    ///
    /// A new password requires the current one; when it is wrong nothing
    /// is changed.
    pub async fn self_edit(&self, id: Uuid, edit: SelfEdit) -> AppResult<User> {
        let user = self.repository.users.get_by_id(id).await?;
        let new_password = edit.requested_password()?;

        let new_hash = match new_password {
            Some(password) => {
                let old = edit.old_password.as_deref().unwrap_or("");
                if !verify_password(&user.password, old)? {
                    tracing::warn!(username = %user.username, "Password change with wrong old password");
                    return Err(AppError::Authentication(Message::new(
                        "error.auth.incorrect_old_password",
                    )));
                }
                Some(hash_password(password)?)
            }
            None => None,
        };

        let mut uow = self.repository.begin().await?;
        if let Some(ref hash) = new_hash {
            self.repository.users.set_password(uow.conn(), id, hash).await?;
        }
        self.repository
            .users
            .set_locale(uow.conn(), id, edit.language)
            .await?;
        uow.commit().await?;

        tracing::info!(
            username = %user.username,
            password_changed = new_hash.is_some(),
            locale = %edit.language,
            "User updated own account"
        );
        self.repository.users.get_by_id(id).await
    }

    /// An administrator resets another user's password and admin flag
    pub async fn admin_edit(&self, id: Uuid, edit: AdminEdit) -> AppResult<User> {
        edit.validate()?;
        let user = self.repository.users.get_by_id(id).await?;
        let password_hash = hash_password(&edit.password)?;

        let mut uow = self.repository.begin().await?;
        self.repository
            .users
            .set_password(uow.conn(), id, &password_hash)
            .await?;
        if edit.admin {
            self.repository.users.grant_role(uow.conn(), id, Role::Admin).await?;
        } else {
            self.repository.users.revoke_role(uow.conn(), id, Role::Admin).await?;
        }
        uow.commit().await?;

        tracing::info!(
            username = %user.username,
            admin = edit.admin,
            "Password reset and admin flag set by administrator"
        );
        self.repository.users.get_by_id(id).await
    }

    /// Badge payload (the id in simple hex form) and its SVG rendering
    pub async fn barcode(&self, id: Uuid) -> AppResult<(String, String)> {
        let user = self.repository.users.get_by_id(id).await?;
        let payload = user.id.simple().to_string();
        let svg = code128_svg(&payload)?;
        Ok((payload, svg))
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Ensure the built-in roles exist and, if configured, the default accounts
    pub async fn bootstrap(&self, config: &BootstrapConfig, locale: Locale) -> AppResult<()> {
        let mut uow = self.repository.begin().await?;
        for role in [Role::Admin, Role::Agent] {
            self.repository.users.ensure_role(uow.conn(), role).await?;
        }
        uow.commit().await?;

        if !config.seed_default_users {
            return Ok(());
        }

        for (username, roles) in DEFAULT_ACCOUNTS {
            if self.repository.users.username_exists(username).await? {
                continue;
            }
            let form = CreateUser {
                username: username.to_string(),
                password: config.default_password.clone(),
                admin: false,
                language: locale,
                first_name: None,
                last_name: None,
            };
            self.create_account(&form, roles).await?;
            tracing::info!(username, "Seeded default account");
        }

        Ok(())
    }
}

fn invalid_credentials() -> AppError {
    AppError::Authentication(Message::new("error.auth.invalid_credentials"))
}

/// Render `payload` as a Code 128 barcode, character set B
pub fn code128_svg(payload: &str) -> AppResult<String> {
    let barcode = Code128::new(format!("Ɓ{}", payload))
        .map_err(|e| AppError::Internal(format!("Failed to encode barcode: {}", e)))?;
    let encoded = barcode.encode();
    SVG::new(BARCODE_HEIGHT)
        .generate(&encoded)
        .map_err(|e| AppError::Internal(format!("Failed to render barcode: {}", e)))
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
