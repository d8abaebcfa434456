use std::future::Future;

use crate::cas::CasClient;
use crate::error::Error;
use crate::service_url;
use crate::types::{AuthOutcome, Failure, Principal, ValidationOutcome, Verification};

/// Consumer-provided mapping from a CAS principal to an application user.
///
/// Called at most once per validated ticket, after `/validate` has completed.
///
/// # Example
///
/// ```rust,ignore
/// impl PrincipalVerifier for MyAppState {
///     type User = User;
///
///     async fn verify(
///         &self,
///         principal: &Principal,
///     ) -> Result<Verification<User>, Box<dyn std::error::Error + Send + Sync>> {
///         match self.repo.find_by_login(principal.as_str()).await? {
///             Some(user) => Ok(Verification::accepted(user)),
///             None => Ok(Verification::declined("unknown user")),
///         }
///     }
/// }
/// ```
pub trait PrincipalVerifier: Send + Sync + 'static {
    type User: Send + 'static;

    /// Returning `Err` yields an error outcome; `Declined` yields a failure.
    fn verify(
        &self,
        principal: &Principal,
    ) -> impl Future<Output = Result<Verification<Self::User>, Box<dyn std::error::Error + Send + Sync>>>
    + Send;
}

/// The slice of an incoming request the protocol driver reads.
pub trait IncomingRequest {
    /// Original path and query, unmodified (e.g. `/page?nextUrl=%2Fhome`).
    fn original_url(&self) -> &str;
}

impl IncomingRequest for str {
    fn original_url(&self) -> &str {
        self
    }
}

impl IncomingRequest for String {
    fn original_url(&self) -> &str {
        self
    }
}

#[cfg(feature = "middleware")]
impl IncomingRequest for axum::http::Uri {
    fn original_url(&self) -> &str {
        self.path_and_query().map_or("/", |pq| pq.as_str())
    }
}

/// Per-request options.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticateOptions {
    /// Force gateway mode regardless of the query string.
    pub gateway: bool,
}

impl AuthenticateOptions {
    #[must_use]
    pub fn gateway() -> Self {
        Self { gateway: true }
    }
}

/// Result-emitting capability supplied by the host framework.
pub trait AuthActions<U> {
    fn redirect(&mut self, url: String);
    fn success(&mut self, user: U, info: Option<String>);
    fn fail(&mut self, failure: Failure);
    fn error(&mut self, err: Error);
}

impl<U> AuthOutcome<U> {
    /// Emit this outcome through exactly one of the host's actions.
    pub fn apply<A: AuthActions<U> + ?Sized>(self, actions: &mut A) {
        match self {
            Self::Redirect(url) => actions.redirect(url),
            Self::Success { user, info } => actions.success(user, info),
            Self::Fail(failure) => actions.fail(failure),
            Self::Error(err) => actions.error(err),
        }
    }
}

/// CAS protocol driver.
///
/// Per request: no ticket → redirect to the login server; ticket → validate it
/// and hand the principal to the [`PrincipalVerifier`].
pub struct CasStrategy<V> {
    client: CasClient,
    verifier: V,
}

impl<V: PrincipalVerifier> CasStrategy<V> {
    #[must_use]
    pub fn new(client: CasClient, verifier: V) -> Self {
        Self { client, verifier }
    }

    #[must_use]
    pub fn client(&self) -> &CasClient {
        &self.client
    }

    #[must_use]
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Run the protocol for one request.
    pub async fn authenticate<R>(
        &self,
        request: &R,
        options: &AuthenticateOptions,
    ) -> AuthOutcome<V::User>
    where
        R: IncomingRequest + ?Sized,
    {
        let original_url = request.original_url();
        let builder = self.client.config().service_url_builder();

        let service = match builder.build(original_url) {
            Ok(service) => service,
            Err(e) => {
                tracing::error!(error = %e, original_url, "Cannot build CAS service URL");
                return AuthOutcome::Error(e);
            }
        };

        let Some(ticket) = service_url::ticket(original_url) else {
            let gateway = options.gateway || builder.detects_gateway(original_url);
            return match self.client.login_url(&service, gateway) {
                Ok(url) => {
                    tracing::debug!(service = %service, gateway, "Redirecting to CAS login");
                    AuthOutcome::Redirect(url)
                }
                Err(e) => AuthOutcome::Error(e),
            };
        };

        let principal = match self.client.validate(&ticket, &service).await {
            Ok(ValidationOutcome::Valid(principal)) => principal,
            Ok(ValidationOutcome::Invalid) => {
                tracing::warn!(ticket = %ticket.redacted(), "CAS ticket rejected");
                return AuthOutcome::Fail(Failure::TicketRejected);
            }
            Err(Error::MalformedResponse(detail)) => {
                tracing::warn!(detail = %detail, "Malformed CAS validate response");
                return AuthOutcome::Fail(Failure::BadResponse(detail));
            }
            Err(e) => {
                tracing::error!(error = %e, "CAS ticket validation failed");
                return AuthOutcome::Error(e);
            }
        };

        match self.verifier.verify(&principal).await {
            Ok(Verification::Accepted { user, info }) => {
                tracing::info!(principal = %principal, "CAS authentication successful");
                AuthOutcome::Success { user, info }
            }
            Ok(Verification::Declined { info }) => {
                tracing::warn!(principal = %principal, "Principal declined by verifier");
                AuthOutcome::Fail(Failure::Declined(info))
            }
            Err(e) => {
                tracing::error!(error = %e, principal = %principal, "Principal verification failed");
                AuthOutcome::Error(Error::Verify(e))
            }
        }
    }

    /// Run the protocol and emit the outcome through `actions`.
    pub async fn authenticate_with<R, A>(
        &self,
        request: &R,
        options: &AuthenticateOptions,
        actions: &mut A,
    ) where
        R: IncomingRequest + ?Sized,
        A: AuthActions<V::User> + ?Sized,
    {
        self.authenticate(request, options).await.apply(actions);
    }
}
