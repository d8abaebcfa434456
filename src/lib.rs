#![doc = include_str!("../README.md")]

pub mod cas;
pub mod error;
#[cfg(feature = "middleware")]
pub mod middleware;
pub mod service_url;
pub mod strategy;
pub mod types;

// Re-exports for convenient access
pub use cas::{CasClient, CasConfig, parse_validation_response};
pub use error::Error;
pub use service_url::{ServiceUrl, ServiceUrlBuilder};
pub use strategy::{
    AuthActions, AuthenticateOptions, CasStrategy, IncomingRequest, PrincipalVerifier,
};
pub use types::{AuthOutcome, Failure, Principal, Ticket, ValidationOutcome, Verification};
