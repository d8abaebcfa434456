use std::future::Future;

use axum::response::Response;

use super::types::CompletedLogin;

/// Consumer-provided completion of a successful CAS login.
///
/// Session management is the application's concern: create a session here,
/// set cookies, then send the browser on.
///
/// # Example
///
/// ```rust,ignore
/// impl LoginHandler<User> for MyAppState {
///     async fn on_success(&self, login: CompletedLogin<User>) -> Response {
///         let cookie = self.sessions.create(&login.user).await;
///         (cookie, login.redirect()).into_response()
///     }
/// }
/// ```
pub trait LoginHandler<U>: Send + Sync + 'static {
    fn on_success(&self, login: CompletedLogin<U>) -> impl Future<Output = Response> + Send;
}
