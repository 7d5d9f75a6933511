//! Moderator account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a moderator with a generated password (printed once)
//! nt-cli admin create -e mod@nothanks.app -n "Moderator Name"
//!
//! # Create a moderator with a chosen password
//! nt-cli admin create -e mod@nothanks.app -n "Moderator Name" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use rand::distr::{Alphanumeric, SampleString};
use sqlx::PgPool;
use thiserror::Error;

use nothanks_admin::services::AuthService;
use nothanks_admin::services::auth::AuthError;
use nothanks_core::AdminUserId;

/// Length of generated passwords.
const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Errors that can occur during moderator management.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Account creation failed.
    #[error("Could not create moderator: {0}")]
    Auth(#[from] AuthError),
}

/// Create a new moderator account.
///
/// When no password is supplied a random one is generated and printed once;
/// it is never stored in plain text.
///
/// # Errors
///
/// Returns `AdminError` if the database is unreachable, the email is
/// invalid, or an account with the email already exists.
pub async fn create_user(
    email: &str,
    name: &str,
    password: Option<&str>,
) -> Result<AdminUserId, AdminError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    tracing::info!("Connecting to admin database...");
    let pool = PgPool::connect(&database_url).await?;

    let generated = password.is_none();
    let password = password.map_or_else(generate_password, String::from);

    tracing::info!("Creating moderator: {} ({})", name, email);
    let user = AuthService::new(&pool)
        .create_account(email, name, &password)
        .await?;

    tracing::info!(
        "Moderator created. ID: {}, Email: {}",
        user.id,
        user.email
    );

    if generated {
        // The only place the password is ever visible; hand it to the
        // operator on stdout rather than the log stream.
        #[allow(clippy::print_stdout)]
        {
            println!("Generated password for {}: {password}", user.email);
            println!("Store it now; it cannot be recovered later.");
        }
    }

    Ok(user.id)
}

/// Generate a random alphanumeric password.
fn generate_password() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), GENERATED_PASSWORD_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_passwords_are_long_and_distinct() {
        let a = generate_password();
        let b = generate_password();
        assert_eq!(a.len(), GENERATED_PASSWORD_LENGTH);
        assert!(a.chars().all(char::is_alphanumeric));
        assert_ne!(a, b);
    }
}
