//! Authentication route handlers.
//!
//! Credential sign-in against the `admin_users` table; the session carries a
//! [`CurrentAdmin`] once verified.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AuthService;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Query parameters for the login page (banner state).
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub error: Option<String>,
}

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// GET /login
pub async fn login_page(Query(params): Query<LoginQuery>) -> LoginTemplate {
    let error = params.error.as_deref().map(|code| match code {
        "credentials" => "Invalid email or password.".to_string(),
        _ => "Login failed. Please try again.".to_string(),
    });
    LoginTemplate { error }
}

/// POST /login
///
/// # Errors
///
/// Returns `AppError` for infrastructure failures; bad credentials redirect
/// back to the form instead.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let auth = AuthService::new(state.pool());

    let user = match auth.login(&form.email, &form.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            warn!("failed admin login attempt");
            return Ok(Redirect::to("/login?error=credentials"));
        }
        Err(other) => return Err(other.into()),
    };

    let current = CurrentAdmin {
        id: user.id,
        email: user.email,
        name: user.name,
    };
    set_current_admin(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store session: {e}")))?;

    info!(admin = %current.email, "admin logged in");
    Ok(Redirect::to("/dashboard"))
}

/// POST /logout
pub async fn logout(session: Session) -> Redirect {
    let _ = clear_current_admin(&session).await;
    Redirect::to("/login")
}
