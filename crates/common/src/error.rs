use derive_more::{Display, Error};

/// Errors produced while reading client fingerprint data.
///
/// Every variant represents expected external input that was missing or
/// malformed rather than an internal fault. All of them are raised
/// synchronously to the immediate caller; nothing is retried here.
#[derive(Debug, Display, Error)]
pub enum FingerprintError {
    /// The remote address string is not a valid IPv4 or IPv6 address.
    ///
    /// Also covers CIDR-suffixed strings such as `192.168.0.1/32`, which the
    /// address type rejects outright.
    #[display("not a valid IP address: {value:?}")]
    InvalidAddress {
        /// The rejected input, verbatim.
        value: String,
    },

    /// The user-agent header was absent, or empty after trimming and
    /// truncation.
    #[display("client did not send a user agent")]
    MissingUserAgent,

    /// No session was active when the session identifier was requested.
    #[display("session was not started")]
    SessionNotStarted,

    /// Settings could not be loaded or failed validation.
    #[display("configuration error: {message}")]
    Configuration {
        /// What went wrong while loading configuration.
        message: String,
    },
}
