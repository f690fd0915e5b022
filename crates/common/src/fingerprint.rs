//! Per-request fingerprint accessor.
//!
//! [`ClientFingerprint`] is the facade over a [`RequestContext`]: it pulls
//! out the remote IP address (validated and memoized), the user-agent string
//! (trimmed and truncated, never cached), and the externally assigned session
//! identifier. One instance per request-handling context; the memoization
//! slot is unsynchronized by design.

use error_stack::Report;
use once_cell::unsync::OnceCell;

use crate::constants::{DEFAULT_USER_AGENT_MAX_LENGTH, OFFLINE_IP_ADDRESS, OFFLINE_USER_AGENT};
use crate::error::FingerprintError;
use crate::ip::IpAddress;
use crate::request::RequestContext;
use crate::settings::{ExecutionMode, Settings};

/// Accessor for the client fingerprint of one request.
pub struct ClientFingerprint<C> {
    context: C,
    mode: ExecutionMode,
    offline_ip_address: String,
    offline_user_agent: String,
    ip_address: OnceCell<IpAddress>,
}

impl<C: RequestContext> ClientFingerprint<C> {
    /// Creates an accessor for a live network request.
    pub fn new(context: C) -> Self {
        Self {
            context,
            mode: ExecutionMode::Http,
            offline_ip_address: OFFLINE_IP_ADDRESS.to_string(),
            offline_user_agent: OFFLINE_USER_AGENT.to_string(),
            ip_address: OnceCell::new(),
        }
    }

    /// Creates an accessor configured from settings.
    ///
    /// In [`ExecutionMode::Offline`] the configured stand-in address and
    /// user agent are substituted instead of reading the context.
    pub fn from_settings(settings: &Settings, context: C) -> Self {
        Self {
            context,
            mode: settings.mode,
            offline_ip_address: settings.offline.ip_address.clone(),
            offline_user_agent: settings.offline.user_agent.clone(),
            ip_address: OnceCell::new(),
        }
    }

    /// The request context this accessor reads from.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The validated remote IP address.
    ///
    /// The first call reads the context's remote address, trims surrounding
    /// whitespace, and validates it; later calls return the cached value
    /// without re-reading the context. A failed construction is not cached.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::InvalidAddress`] if the context-provided
    /// string is not a valid address. This can happen behind non-conforming
    /// proxies or in malformed server environments.
    pub fn ip_address(&self) -> Result<&IpAddress, Report<FingerprintError>> {
        self.ip_address.get_or_try_init(|| {
            let raw = match self.mode {
                ExecutionMode::Offline => self.offline_ip_address.as_str(),
                ExecutionMode::Http => self.context.remote_addr().unwrap_or(""),
            };
            let address = IpAddress::new(raw.trim())?;
            log::debug!("resolved client address {address}");
            Ok(address)
        })
    }

    /// The client's user-agent string, trimmed and truncated to at most
    /// `max_length` characters.
    ///
    /// Re-read and re-validated on every call, unlike the address.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::MissingUserAgent`] if the value is empty
    /// after trimming and truncation.
    pub fn user_agent(&self, max_length: usize) -> Result<String, Report<FingerprintError>> {
        let raw = match self.mode {
            ExecutionMode::Offline => Some(self.offline_user_agent.as_str()),
            ExecutionMode::Http => self.context.user_agent(),
        };

        let value: String = raw
            .unwrap_or("")
            .trim()
            .chars()
            .take(max_length)
            .collect();

        if value.is_empty() {
            log::debug!("rejecting absent or empty user agent");
            return Err(Report::new(FingerprintError::MissingUserAgent));
        }

        Ok(value)
    }

    /// [`Self::user_agent`] with the default limit of
    /// [`DEFAULT_USER_AGENT_MAX_LENGTH`] characters.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::MissingUserAgent`] if the value is empty
    /// after trimming and truncation.
    pub fn user_agent_default(&self) -> Result<String, Report<FingerprintError>> {
        self.user_agent(DEFAULT_USER_AGENT_MAX_LENGTH)
    }

    /// The externally assigned session identifier, verbatim.
    ///
    /// Session tracking is owned by an external subsystem; this accessor
    /// neither generates nor validates identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::SessionNotStarted`] if no session is
    /// active.
    pub fn session_id(&self) -> Result<String, Report<FingerprintError>> {
        match self.context.session_id() {
            Some(id) => Ok(id.to_string()),
            None => Err(Report::new(FingerprintError::SessionNotStarted)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::test_support::tests::{create_test_settings, TestContext};

    /// Counts context reads so tests can prove what got re-read.
    #[derive(Default)]
    struct CountingContext {
        remote_addr: Option<&'static str>,
        user_agent: Option<&'static str>,
        addr_reads: Cell<u32>,
        agent_reads: Cell<u32>,
    }

    impl RequestContext for CountingContext {
        fn remote_addr(&self) -> Option<&str> {
            self.addr_reads.set(self.addr_reads.get() + 1);
            self.remote_addr
        }

        fn user_agent(&self) -> Option<&str> {
            self.agent_reads.set(self.agent_reads.get() + 1);
            self.user_agent
        }

        fn session_id(&self) -> Option<&str> {
            None
        }
    }

    /// Context whose remote address can be swapped after construction.
    #[derive(Default)]
    struct SwapContext {
        remote_addr: Cell<Option<&'static str>>,
    }

    impl RequestContext for SwapContext {
        fn remote_addr(&self) -> Option<&str> {
            self.remote_addr.get()
        }

        fn user_agent(&self) -> Option<&str> {
            None
        }

        fn session_id(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_ip_address_valid() {
        let fingerprint =
            ClientFingerprint::new(TestContext::with_remote_addr("203.0.113.7"));

        let address = fingerprint.ip_address().unwrap();
        assert_eq!(address.as_str(), "203.0.113.7");
        assert!(address.is_ipv4());
    }

    #[test]
    fn test_ip_address_trims_whitespace() {
        let fingerprint =
            ClientFingerprint::new(TestContext::with_remote_addr("  203.0.113.7  "));

        assert_eq!(fingerprint.ip_address().unwrap().as_str(), "203.0.113.7");
    }

    #[test]
    fn test_ip_address_invalid_propagates() {
        let fingerprint = ClientFingerprint::new(TestContext::with_remote_addr("not-an-ip"));
        assert!(fingerprint.ip_address().is_err());
    }

    #[test]
    fn test_ip_address_missing_is_invalid() {
        let fingerprint = ClientFingerprint::new(TestContext::default());
        assert!(fingerprint.ip_address().is_err());
    }

    #[test]
    fn test_ip_address_read_once() {
        let context = CountingContext {
            remote_addr: Some("203.0.113.7"),
            ..CountingContext::default()
        };
        let fingerprint = ClientFingerprint::new(context);

        let first = fingerprint.ip_address().unwrap().clone();
        let second = fingerprint.ip_address().unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(fingerprint.context().addr_reads.get(), 1);
    }

    #[test]
    fn test_ip_address_cached_across_context_mutation() {
        let context = SwapContext::default();
        context.remote_addr.set(Some("203.0.113.7"));
        let fingerprint = ClientFingerprint::new(context);

        assert_eq!(fingerprint.ip_address().unwrap().as_str(), "203.0.113.7");

        // Mutating the underlying value must not change the cached address.
        fingerprint.context().remote_addr.set(Some("10.9.9.9"));
        assert_eq!(fingerprint.ip_address().unwrap().as_str(), "203.0.113.7");
    }

    #[test]
    fn test_ip_address_failure_not_cached() {
        let context = SwapContext::default();
        context.remote_addr.set(Some("not-an-ip"));
        let fingerprint = ClientFingerprint::new(context);

        assert!(fingerprint.ip_address().is_err());

        fingerprint.context().remote_addr.set(Some("203.0.113.7"));
        assert_eq!(fingerprint.ip_address().unwrap().as_str(), "203.0.113.7");
    }

    #[test]
    fn test_user_agent_valid() {
        let context = TestContext {
            user_agent: Some("Mozilla/5.0".to_string()),
            ..TestContext::default()
        };
        let fingerprint = ClientFingerprint::new(context);

        assert_eq!(fingerprint.user_agent_default().unwrap(), "Mozilla/5.0");
    }

    #[test]
    fn test_user_agent_trims_whitespace() {
        let context = TestContext {
            user_agent: Some("  Mozilla/5.0  ".to_string()),
            ..TestContext::default()
        };
        let fingerprint = ClientFingerprint::new(context);

        assert_eq!(fingerprint.user_agent_default().unwrap(), "Mozilla/5.0");
    }

    #[test]
    fn test_user_agent_whitespace_only_rejected() {
        let context = TestContext {
            user_agent: Some("   ".to_string()),
            ..TestContext::default()
        };
        let fingerprint = ClientFingerprint::new(context);

        assert!(fingerprint.user_agent_default().is_err());
    }

    #[test]
    fn test_user_agent_missing_rejected() {
        let fingerprint = ClientFingerprint::new(TestContext::default());
        assert!(fingerprint.user_agent_default().is_err());
    }

    #[test]
    fn test_user_agent_truncates_to_char_count() {
        let context = TestContext {
            user_agent: Some("Mozilla/5.0 (X11; Linux x86_64)".to_string()),
            ..TestContext::default()
        };
        let fingerprint = ClientFingerprint::new(context);

        assert_eq!(fingerprint.user_agent(7).unwrap(), "Mozilla");

        // Truncation counts characters, not bytes.
        let context = TestContext {
            user_agent: Some("αβγδ".to_string()),
            ..TestContext::default()
        };
        let fingerprint = ClientFingerprint::new(context);
        assert_eq!(fingerprint.user_agent(2).unwrap(), "αβ");
    }

    #[test]
    fn test_user_agent_zero_limit_rejected() {
        let context = TestContext {
            user_agent: Some("Mozilla/5.0".to_string()),
            ..TestContext::default()
        };
        let fingerprint = ClientFingerprint::new(context);

        assert!(fingerprint.user_agent(0).is_err());
    }

    #[test]
    fn test_user_agent_not_cached() {
        let context = CountingContext {
            user_agent: Some("Mozilla/5.0"),
            ..CountingContext::default()
        };
        let fingerprint = ClientFingerprint::new(context);

        fingerprint.user_agent_default().unwrap();
        fingerprint.user_agent_default().unwrap();

        assert_eq!(fingerprint.context().agent_reads.get(), 2);
    }

    #[test]
    fn test_session_id_active() {
        let context = TestContext {
            session_id: Some("sess-42".to_string()),
            ..TestContext::default()
        };
        let fingerprint = ClientFingerprint::new(context);

        assert_eq!(fingerprint.session_id().unwrap(), "sess-42");
    }

    #[test]
    fn test_session_id_inactive() {
        let fingerprint = ClientFingerprint::new(TestContext::default());
        assert!(fingerprint.session_id().is_err());
    }

    #[test]
    fn test_offline_mode_substitutes_configured_values() {
        let mut settings = create_test_settings();
        settings.mode = ExecutionMode::Offline;

        let context = CountingContext::default();
        let fingerprint = ClientFingerprint::from_settings(&settings, context);

        let address = fingerprint.ip_address().unwrap();
        assert_eq!(address.as_str(), "127.0.0.1");
        assert!(address.in_reserved_range());

        assert_eq!(
            fingerprint.user_agent_default().unwrap(),
            settings.offline.user_agent
        );

        // Offline mode never touches the context.
        assert_eq!(fingerprint.context().addr_reads.get(), 0);
        assert_eq!(fingerprint.context().agent_reads.get(), 0);
    }

    #[test]
    fn test_http_mode_from_settings_reads_context() {
        let settings = create_test_settings();
        let context = TestContext::with_remote_addr("198.51.100.4");
        let fingerprint = ClientFingerprint::from_settings(&settings, context);

        assert_eq!(fingerprint.ip_address().unwrap().as_str(), "198.51.100.4");
    }
}
