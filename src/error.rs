#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("The response from the server was bad: {0}")]
    MalformedResponse(String),
    #[error("Principal verification error: {0}")]
    Verify(Box<dyn std::error::Error + Send + Sync>),
}
