use url::Url;

use crate::error::Error;
use crate::service_url::{ServiceUrl, ServiceUrlBuilder};
use crate::types::{Principal, Ticket, ValidationOutcome};

/// CAS client configuration.
///
/// Required fields are constructor parameters: no runtime "missing field" errors.
///
/// ```rust,ignore
/// use cas_sso::CasConfig;
///
/// let config = CasConfig::new(
///     "https://sso.example.com/cas".parse()?,
///     "https://app.example.com".parse()?,
/// )
/// .with_next_url_param("returnTo");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CasConfig {
    pub(crate) sso_base_url: Url,
    pub(crate) service: ServiceUrlBuilder,
}

impl CasConfig {
    /// Create a new CAS configuration.
    ///
    /// - `sso_base_url`: login server base, e.g. `https://sso.example.com/cas`
    /// - `server_base_url`: this application's base URL, used to resolve request paths
    #[must_use]
    pub fn new(sso_base_url: Url, server_base_url: Url) -> Self {
        Self {
            sso_base_url,
            service: ServiceUrlBuilder::new(server_base_url),
        }
    }

    /// Override the gateway marker parameter (default: `useGateway`).
    #[must_use]
    pub fn with_gateway_param(mut self, name: impl Into<String>) -> Self {
        self.service = self.service.with_gateway_param(name);
        self
    }

    /// Override the post-login destination parameter (default: `nextUrl`).
    #[must_use]
    pub fn with_next_url_param(mut self, name: impl Into<String>) -> Self {
        self.service = self.service.with_next_url_param(name);
        self
    }

    /// CAS login server base URL.
    #[must_use]
    pub fn sso_base_url(&self) -> &Url {
        &self.sso_base_url
    }

    /// This application's base URL.
    #[must_use]
    pub fn server_base_url(&self) -> &Url {
        self.service.base()
    }

    /// Service URL builder derived from this configuration.
    #[must_use]
    pub fn service_url_builder(&self) -> &ServiceUrlBuilder {
        &self.service
    }

    fn endpoint(&self, name: &str) -> Result<Url, Error> {
        let base = self.sso_base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{name}"))?)
    }
}

/// CAS 1.0 protocol client: builds login URLs and validates service tickets.
pub struct CasClient {
    config: CasConfig,
    http: reqwest::Client,
}

impl CasClient {
    /// Create a new CAS client.
    #[must_use]
    pub fn new(config: CasConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse, timeouts or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CasConfig {
        &self.config
    }

    /// `{ssoBase}/login?service=<service>[&gateway=true]`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the login endpoint cannot be formed.
    pub fn login_url(&self, service: &ServiceUrl, gateway: bool) -> Result<String, Error> {
        let mut url = self.config.endpoint("login")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("service", service.as_str());
            if gateway {
                query.append_pair("gateway", "true");
            }
        }
        Ok(url.into())
    }

    /// `{ssoBase}/validate?ticket=<ticket>&service=<service>`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the validate endpoint cannot be formed.
    pub fn validate_url(&self, ticket: &Ticket, service: &ServiceUrl) -> Result<Url, Error> {
        let mut url = self.config.endpoint("validate")?;
        url.query_pairs_mut()
            .append_pair("ticket", ticket.as_str())
            .append_pair("service", service.as_str());
        Ok(url)
    }

    /// Redeem a service ticket against the login server's `/validate` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the login server is unreachable, or
    /// [`Error::MalformedResponse`] if the answer is not a CAS 1.0 response.
    pub async fn validate(
        &self,
        ticket: &Ticket,
        service: &ServiceUrl,
    ) -> Result<ValidationOutcome, Error> {
        let url = self.validate_url(ticket, service)?;

        tracing::debug!(ticket = %ticket.redacted(), service = %service, "Validating CAS ticket");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "CAS validate returned non-success status");
            return Err(Error::MalformedResponse(format!("status {}", status.as_u16())));
        }

        parse_validation_response(&body)
    }
}

/// Parse a CAS 1.0 `/validate` body.
///
/// ```text
/// yes
/// u1foobar
/// ```
///
/// or `no`. Anything else is malformed.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] for any other shape.
pub fn parse_validation_response(body: &str) -> Result<ValidationOutcome, Error> {
    let mut lines = body.split('\n').map(|line| line.trim_end_matches('\r'));

    match lines.next() {
        Some("no") => Ok(ValidationOutcome::Invalid),
        Some("yes") => match lines.next() {
            Some(principal) if !principal.is_empty() => {
                Ok(ValidationOutcome::Valid(Principal(principal.to_owned())))
            }
            _ => Err(Error::MalformedResponse("missing principal".into())),
        },
        Some("") | None => Err(Error::MalformedResponse("empty body".into())),
        Some(other) => Err(Error::MalformedResponse(format!(
            "unexpected first line '{other}'"
        ))),
    }
}
