use axum::response::Response;

use super::routes::found;

/// A validated and verified CAS login, handed to [`LoginHandler`](super::LoginHandler).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CompletedLogin<U> {
    /// User returned by the [`PrincipalVerifier`](crate::strategy::PrincipalVerifier).
    pub user: U,
    /// Optional verifier info.
    pub info: Option<String>,
    /// Local path to continue to: the request's `nextUrl` or the configured default.
    pub redirect_to: String,
}

impl<U> CompletedLogin<U> {
    /// `302 Found` to [`redirect_to`](Self::redirect_to).
    #[must_use]
    pub fn redirect(&self) -> Response {
        found(&self.redirect_to)
    }
}
