//! Plug-and-play CAS authentication for Axum.
//!
//! Mounts a login route that runs the CAS protocol: redirect to the login
//! server when the request has no ticket, validate the ticket when the
//! browser comes back, then hand the verified user to the application.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cas_sso::middleware::{CasAuthConfig, cas_routes};
//!
//! // 1. Implement PrincipalVerifier and LoginHandler for your app
//! // 2. Configure from environment
//! let config = CasAuthConfig::from_env()?;
//!
//! // 3. Mount auth routes
//! let app = axum::Router::new()
//!     .merge(cas_routes(config, verifier, login_handler));
//!
//! // 4. Link users to /auth/cas/login?nextUrl=%2Fdashboard
//! ```

mod config;
mod error;
mod routes;
mod state;
mod traits;
mod types;

pub use config::CasAuthConfig;
pub use error::AuthError;
pub use routes::cas_routes;
pub use traits::LoginHandler;
pub use types::CompletedLogin;
