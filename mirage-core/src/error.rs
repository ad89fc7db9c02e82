use thiserror::Error;

/// Failure taxonomy of the proxy core.
///
/// Chunk-local upstream failures are absorbed by the hydrator and never
/// surface here; these variants describe failures that leave a whole
/// operation without a usable result.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed virtual token: {0}")]
    MalformedToken(String),

    #[error("Membership read failed: {0}")]
    MembershipRead(String),

    #[error("Cache build failed: {0}")]
    CacheBuild(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
