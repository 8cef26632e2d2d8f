use axum::{
    extract::State,
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        password,
        repo_types::User,
        session::{self, SessionUser, SESSION_USER_KEY},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(mut form): Form<RegisterForm>,
) -> Result<Redirect, ApiError> {
    form.email = form.email.trim().to_string();

    if form.email.is_empty() || form.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required"));
    }
    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "register with invalid email");
        return Err(ApiError::Validation("Invalid email"));
    }
    if form.password != form.confirm_password {
        return Err(ApiError::Validation("Passwords do not match"));
    }

    // Fast path. The UNIQUE constraint on users.email catches the race
    // where two registrations pass this check concurrently; the insert's
    // unique-violation error also maps to Conflict.
    if User::find_by_email(&state.db, &form.email).await?.is_some() {
        warn!(email = %form.email, "email already registered");
        return Err(ApiError::Conflict);
    }

    let hash = password::hash_password(form.password).await?;
    let name = form.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let user = User::create(&state.db, name, &form.email, &hash).await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Redirect::to("/login.html?registered=1"))
}

#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(mut form): Form<LoginForm>,
) -> Result<Redirect, ApiError> {
    form.email = form.email.trim().to_string();

    if form.email.is_empty() || form.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required"));
    }

    // Unknown email, deactivated account and wrong password all surface the
    // same InvalidCredentials.
    let Some(user) = User::find_active_by_email(&state.db, &form.email).await? else {
        warn!(email = %form.email, "login for unknown or inactive email");
        return Err(ApiError::InvalidCredentials);
    };

    let ok = password::verify_password(form.password, user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    User::touch_last_login(&state.db, user.id).await?;

    // Fresh id for the authenticated session; no cookie was issued before
    // this point because the session is created lazily.
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    session
        .insert(SESSION_USER_KEY, SessionUser::from(&user))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    info!(user_id = user.id, "user logged in");
    Ok(Redirect::to("/dashboard"))
}

/// Destroys the session server-side and drops the cookie. Idempotent: a
/// logout with no session is still a redirect, not an error. If the store
/// cannot complete the delete, the cookie stays and the client gets a 500.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(Redirect::to("/login.html?logged_out=1"))
}

/// Session introspection. Pure read of the session payload.
pub async fn me(session: Session) -> Result<Json<SessionUser>, ApiError> {
    match session::current_user(&session).await? {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotAuthenticated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("a@nodot"));
    }
}
