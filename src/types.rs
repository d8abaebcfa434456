use derive_more::{Display, From, Into};

use crate::error::Error;

/// CAS service ticket (opaque, single-use).
///
/// Issued by the login server and passed back on the return visit as the
/// `ticket` query parameter. Never empty: an empty `ticket` parameter means
/// "not yet authenticated".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Into)]
pub struct Ticket(String);

impl Ticket {
    /// Wrap a raw ticket value. Returns `None` for an empty string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        (!value.is_empty()).then_some(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log output. Keeps at most the first 8 characters.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => format!("{}...", &self.0[..idx]),
            None => self.0.clone(),
        }
    }
}

/// Authenticated identifier returned by the CAS server (line 2 of a `yes` response).
///
/// Opaque: the embedding application maps it to its own user object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Into)]
pub struct Principal(pub String);

impl Principal {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parsed `/validate` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Server answered `no`.
    Invalid,
    /// Server answered `yes` with a principal.
    Valid(Principal),
}

/// Why an authentication attempt failed (as opposed to errored).
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[non_exhaustive]
pub enum Failure {
    /// The login server rejected the ticket.
    #[display("Authentication failed")]
    TicketRejected,
    /// The validation response could not be understood.
    #[display("The response from the server was bad: {_0}")]
    BadResponse(String),
    /// The verifier declined the principal.
    #[display("Principal declined: {}", _0.as_deref().unwrap_or("no reason given"))]
    Declined(Option<String>),
}

/// Result of handing a principal to a [`PrincipalVerifier`](crate::strategy::PrincipalVerifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification<U> {
    /// The principal maps to an application user.
    Accepted { user: U, info: Option<String> },
    /// The application refuses this principal.
    Declined { info: Option<String> },
}

impl<U> Verification<U> {
    #[must_use]
    pub fn accepted(user: U) -> Self {
        Self::Accepted { user, info: None }
    }

    #[must_use]
    pub fn declined(info: impl Into<String>) -> Self {
        Self::Declined {
            info: Some(info.into()),
        }
    }
}

/// Terminal outcome of one `authenticate` call.
#[derive(Debug)]
pub enum AuthOutcome<U> {
    /// No ticket: send the browser to this login URL (HTTP 302).
    Redirect(String),
    /// Ticket validated and principal accepted.
    Success { user: U, info: Option<String> },
    /// Ticket rejected, bad response, or principal declined (typically 401).
    Fail(Failure),
    /// Login server unreachable or verifier error (typically 5xx).
    Error(Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ticket_is_absent() {
        assert!(Ticket::new("").is_none());
        assert_eq!(Ticket::new("ST-1").unwrap().as_str(), "ST-1");
    }

    #[test]
    fn ticket_redacted_keeps_prefix() {
        let ticket = Ticket::new("ST-123456789-abcdef").unwrap();
        assert_eq!(ticket.redacted(), "ST-12345...");

        let short = Ticket::new("ST-1").unwrap();
        assert_eq!(short.redacted(), "ST-1");
    }

    #[test]
    fn principal_from_string() {
        let principal = Principal::from("user123".to_string());
        assert_eq!(principal.to_string(), "user123");
        assert_eq!(principal.as_str(), "user123");
    }

    #[test]
    fn failure_messages() {
        assert_eq!(Failure::TicketRejected.to_string(), "Authentication failed");
        assert_eq!(
            Failure::BadResponse("empty body".into()).to_string(),
            "The response from the server was bad: empty body"
        );
        assert_eq!(
            Failure::Declined(None).to_string(),
            "Principal declined: no reason given"
        );
        assert_eq!(
            Failure::Declined(Some("suspended".into())).to_string(),
            "Principal declined: suspended"
        );
    }

    #[test]
    fn verification_constructors() {
        assert_eq!(
            Verification::accepted(7),
            Verification::Accepted { user: 7, info: None }
        );
        assert_eq!(
            Verification::<()>::declined("nope"),
            Verification::Declined {
                info: Some("nope".into())
            }
        );
    }
}
