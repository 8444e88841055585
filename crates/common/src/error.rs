use thiserror::Error;

/// Failure raised by a remote collaborator call.
///
/// The orchestrator treats every variant uniformly: the call that raised it
/// terminates the build attempt at the point of failure.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The request never produced a response (connect, DNS, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success HTTP status.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The response parsed but a required field was absent.
    #[error("response missing required field: {0}")]
    MissingField(&'static str),
}
