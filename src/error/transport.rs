use thiserror::Error;

/// Failures of the command channel (console input or RCON queries).
///
/// Transport failures never escape to users as hard errors; status displays render
/// them as "N/A".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint could not be reached (server down, connection refused, timeout).
    #[error("Server is not running or the console is unavailable: {0}")]
    Unavailable(String),

    /// RCON rejected the configured password.
    #[error("RCON authentication failed")]
    AuthenticationFailed,

    /// The endpoint answered with something that is not a valid reply.
    #[error("Malformed reply from server: {0}")]
    Protocol(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Unavailable(err.to_string())
    }
}
