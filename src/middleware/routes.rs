use std::sync::Arc;

use axum::Router;
use axum::extract::{OriginalUri, State};
use axum::http::{StatusCode, header::LOCATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use super::config::CasAuthConfig;
use super::error::AuthError;
use super::state::AuthState;
use super::traits::LoginHandler;
use super::types::CompletedLogin;
use crate::strategy::{AuthenticateOptions, CasStrategy, IncomingRequest, PrincipalVerifier};
use crate::types::AuthOutcome;

/// Create the CAS authentication router.
///
/// Mounts `GET {auth_path}/login`, which redirects to the CAS server when the
/// request has no ticket and validates the ticket when it comes back.
pub fn cas_routes<V, H>(config: CasAuthConfig, verifier: V, login_handler: H) -> Router
where
    V: PrincipalVerifier,
    H: LoginHandler<V::User>,
{
    let auth_path = config.settings.auth_path.clone();

    let state = AuthState {
        strategy: Arc::new(CasStrategy::new(config.client, verifier)),
        login_handler: Arc::new(login_handler),
        settings: config.settings,
    };

    Router::new()
        .route(&format!("{auth_path}/login"), get(login::<V, H>))
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login<V, H>(
    State(state): State<AuthState<V, H>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, AuthError>
where
    V: PrincipalVerifier,
    H: LoginHandler<V::User>,
{
    // Gateway mode only via the request's own marker, which is stripped from
    // `service`; the ticket-less gateway return then falls back to a normal login.
    let options = AuthenticateOptions::default();

    match state.strategy.authenticate(&uri, &options).await {
        AuthOutcome::Redirect(url) => Ok(found(&url)),
        AuthOutcome::Success { user, info } => {
            let redirect_to = state
                .strategy
                .client()
                .config()
                .service_url_builder()
                .build(uri.original_url())
                .ok()
                .and_then(|service| service.next_url().map(str::to_owned))
                .filter(|next| is_local_path(next))
                .unwrap_or_else(|| state.settings.login_redirect.clone());

            let login = CompletedLogin {
                user,
                info,
                redirect_to,
            };
            Ok(state.login_handler.on_success(login).await)
        }
        AuthOutcome::Fail(failure) => Err(AuthError::Unauthenticated(failure)),
        AuthOutcome::Error(e) => Err(AuthError::Internal(e)),
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// `302 Found` with a `Location` header.
pub(super) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_owned())]).into_response()
}

/// Same-origin absolute path usable as a `Location` value: `/x` but not
/// `//host`, `/\host`, or anything containing control characters.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control)
}
