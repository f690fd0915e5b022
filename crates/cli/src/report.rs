//! JSON report of the three fingerprint reads.

use serde::Serialize;

use client_fingerprint_common::fingerprint::ClientFingerprint;
use client_fingerprint_common::request::RequestContext;

/// Classification of a validated client address.
#[derive(Debug, Serialize)]
pub struct AddressReport {
    pub address: String,
    pub family: &'static str,
    pub private: bool,
    pub reserved: bool,
}

/// Outcome of the three fingerprint reads for one request context.
///
/// Each field pair is either the value or the error string; a partial
/// failure (say, a missing user agent) does not suppress the other fields.
#[derive(Debug, Serialize)]
pub struct FingerprintReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<AddressReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id_error: Option<String>,
}

impl FingerprintReport {
    /// Runs all three accessor operations and records each outcome.
    pub fn collect<C: RequestContext>(
        fingerprint: &ClientFingerprint<C>,
        max_length: usize,
    ) -> Self {
        let (ip_address, ip_address_error) = match fingerprint.ip_address() {
            Ok(address) => (
                Some(AddressReport {
                    address: address.to_string(),
                    family: if address.is_ipv4() { "ipv4" } else { "ipv6" },
                    private: address.in_private_range(),
                    reserved: address.in_reserved_range(),
                }),
                None,
            ),
            Err(err) => (None, Some(err.to_string())),
        };

        let (user_agent, user_agent_error) = match fingerprint.user_agent(max_length) {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err.to_string())),
        };

        let (session_id, session_id_error) = match fingerprint.session_id() {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err.to_string())),
        };

        Self {
            ip_address,
            ip_address_error,
            user_agent,
            user_agent_error,
            session_id,
            session_id_error,
        }
    }
}
