use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tower_sessions::Session;

use crate::auth::session::{SessionUser, SESSION_USER_KEY};
use crate::error::ApiError;
use crate::state::AppState;

pub fn page_routes() -> Router<AppState> {
    // The dashboard page lives outside the static root so the fallback
    // cannot serve it; the guarded route is its only path to a client.
    let protected = Router::new()
        .route_service("/dashboard", ServeFile::new("private/dashboard.html"))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        .route("/", get(root))
        .merge(protected)
        .fallback_service(ServeDir::new("public"))
}

async fn root() -> Redirect {
    Redirect::to("/login.html")
}

/// Route guard: checks only that an authenticated session exists. Browsers
/// without one are bounced to the login page before the protected handler
/// runs. The payload is not re-validated against the database here.
async fn require_auth(session: Session, req: Request, next: Next) -> Response {
    match session.get::<SessionUser>(SESSION_USER_KEY).await {
        Ok(Some(_)) => next.run(req).await,
        Ok(None) => Redirect::to("/login.html").into_response(),
        Err(e) => ApiError::Internal(e.into()).into_response(),
    }
}
