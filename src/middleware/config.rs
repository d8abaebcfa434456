use url::Url;

use super::error::AuthError;
use crate::cas::{CasClient, CasConfig};

/// Shared auth settings used by both config and runtime state.
#[derive(Debug, Clone)]
pub(crate) struct AuthSettings {
    pub(crate) auth_path: String,
    pub(crate) login_redirect: String,
}

impl AuthSettings {
    fn defaults() -> Self {
        Self {
            auth_path: "/auth/cas".into(),
            login_redirect: "/".into(),
        }
    }
}

/// CAS middleware configuration.
///
/// Required field (`client`) is a constructor parameter: no runtime "missing field" errors.
///
/// Use [`from_env()`](CasAuthConfig::from_env) for convention-based setup,
/// or [`new()`](CasAuthConfig::new) with `with_*` methods for full control.
pub struct CasAuthConfig {
    pub(super) client: CasClient,
    pub(super) settings: AuthSettings,
}

impl CasAuthConfig {
    /// Create config with the required `CasClient`.
    ///
    /// All optional fields use sensible defaults. Override with `with_*` methods.
    #[must_use]
    pub fn new(client: CasClient) -> Self {
        Self {
            client,
            settings: AuthSettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `CAS_SSO_BASE_URL`: CAS login server base URL
    /// - `CAS_SERVER_BASE_URL`: this application's public base URL
    ///
    /// # Optional env vars
    /// - `CAS_AUTH_PATH`: mount point of the login route (default `/auth/cas`)
    /// - `CAS_LOGIN_REDIRECT`: where to go after login when no `nextUrl` is given
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if required env vars are missing or URLs are invalid.
    pub fn from_env() -> Result<Self, AuthError> {
        let sso_base_url = required_url("CAS_SSO_BASE_URL")?;
        let server_base_url = required_url("CAS_SERVER_BASE_URL")?;

        let mut config = Self::new(CasClient::new(CasConfig::new(sso_base_url, server_base_url)));

        if let Ok(path) = std::env::var("CAS_AUTH_PATH") {
            config = config.with_auth_path(path);
        }
        if let Ok(path) = std::env::var("CAS_LOGIN_REDIRECT") {
            config = config.with_login_redirect(path);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    #[must_use]
    pub fn with_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.login_redirect = path.into();
        self
    }

}

fn required_url(name: &str) -> Result<Url, AuthError> {
    let raw = std::env::var(name).map_err(|_| AuthError::Config(format!("{name} is required")))?;
    raw.parse()
        .map_err(|e| AuthError::Config(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CasClient {
        CasClient::new(CasConfig::new(
            "https://sso.example.com/cas".parse().unwrap(),
            "https://app.example.com".parse().unwrap(),
        ))
    }

    #[test]
    fn defaults() {
        let config = CasAuthConfig::new(client());
        assert_eq!(config.settings.auth_path, "/auth/cas");
        assert_eq!(config.settings.login_redirect, "/");
    }

    #[test]
    fn overrides() {
        let config = CasAuthConfig::new(client())
            .with_auth_path("/sso")
            .with_login_redirect("/dashboard");
        assert_eq!(config.settings.auth_path, "/sso");
        assert_eq!(config.settings.login_redirect, "/dashboard");
    }
}
