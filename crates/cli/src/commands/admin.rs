//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin user
//! kiosk-cli admin create -e admin@example.com -p "s3cure-pass" -f Admin -l User
//! ```
//!
//! # Environment Variables
//!
//! - `KIOSK_DATABASE_URL` - `PostgreSQL` connection string
//! - `SEED_ADMIN_PASSWORD` - Password fallback when `-p` is not given

use thiserror::Error;

use kiosk_api::db::{self, RepositoryError, UserRepository};
use kiosk_api::services::auth::hash_password;
use kiosk_core::{Email, Role};

use super::migrate::MigrationError;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database URL missing from the environment.
    #[error(transparent)]
    Config(#[from] MigrationError),

    /// Database error.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password missing or too weak.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// Password hashing failed.
    #[error("Failed to hash password")]
    PasswordHash,
}

/// Create a new admin user.
///
/// The password comes from the `-p` flag, falling back to the
/// `SEED_ADMIN_PASSWORD` environment variable.
///
/// # Errors
///
/// Returns `AdminError` if validation fails, the email is taken, or the
/// database is unreachable.
pub async fn create_user(
    email: &str,
    password: Option<&str>,
    first_name: &str,
    last_name: &str,
) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let password = match password {
        Some(p) => p.to_owned(),
        None => std::env::var("SEED_ADMIN_PASSWORD").map_err(|_| {
            AdminError::InvalidPassword(
                "pass -p or set SEED_ADMIN_PASSWORD in the environment".to_owned(),
            )
        })?,
    };
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::InvalidPassword(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let database_url = super::migrate::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url)
        .await
        .map_err(RepositoryError::from)?;
    let users = UserRepository::new(&pool);

    if users.get_by_email(email.as_str()).await?.is_some() {
        return Err(AdminError::UserExists(email.as_str().to_owned()));
    }

    let hash = hash_password(&password).map_err(|_| AdminError::PasswordHash)?;
    let user = users
        .create(email.as_str(), &hash, first_name, last_name, None, Role::Admin)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}
