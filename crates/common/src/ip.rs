//! IP address value type and range classification.
//!
//! [`IpAddress`] keeps the original textual form alongside the parsed
//! [`std::net::IpAddr`] and answers range-membership queries with exact
//! prefix/mask arithmetic over the 32-bit or 128-bit integer form of the
//! address. The private and reserved blocks are stated as data so each block
//! is testable on its own.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use error_stack::Report;

use crate::error::FingerprintError;

/// IPv4 blocks reserved for private networks (RFC 1918).
const PRIVATE_V4_BLOCKS: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
];

/// IPv6 unique-local block (RFC 4193); everything starting `fc` or `fd`.
const PRIVATE_V6_BLOCKS: &[(Ipv6Addr, u8)] = &[(Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7)];

/// IPv4 special-use blocks: "this network", loopback, link-local, and the
/// former class E range. `240.0.0.0/4` runs through `255.255.255.255`, so the
/// broadcast address counts as reserved.
const RESERVED_V4_BLOCKS: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
];

/// IPv6 special-use blocks: unspecified, loopback, IPv4-mapped, link-local.
const RESERVED_V6_BLOCKS: &[(Ipv6Addr, u8)] = &[
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0), 128),
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1), 128),
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0xffff, 0, 0), 96),
    (Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
];

fn v4_in_block(addr: Ipv4Addr, network: Ipv4Addr, prefix: u8) -> bool {
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    };
    u32::from(addr) & mask == u32::from(network) & mask
}

fn v6_in_block(addr: Ipv6Addr, network: Ipv6Addr, prefix: u8) -> bool {
    let mask = if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix))
    };
    u128::from(addr) & mask == u128::from(network) & mask
}

/// A validated, immutable client IP address.
///
/// Construction fails unless the input is a bare IPv4 dotted-quad or IPv6
/// colon-hex address; prefix/mask notation is rejected. The original text is
/// kept verbatim, so [`Display`](fmt::Display) round-trips the exact input
/// with no normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpAddress {
    raw: String,
    addr: IpAddr,
}

impl IpAddress {
    /// Parses `raw` as an IPv4 or IPv6 address.
    ///
    /// Purely syntactic; no DNS or network resolution is performed. The
    /// `std::net` parsers already reject CIDR suffixes, octets above 255, and
    /// non-hex digits, so no extra screening happens here.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::InvalidAddress`] if `raw` parses as
    /// neither address family.
    pub fn new(raw: &str) -> Result<Self, Report<FingerprintError>> {
        let addr = raw.parse::<IpAddr>().map_err(|_| {
            Report::new(FingerprintError::InvalidAddress {
                value: raw.to_string(),
            })
        })?;
        Ok(Self {
            raw: raw.to_string(),
            addr,
        })
    }

    /// Returns true if the address parsed under IPv4 rules.
    pub fn is_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }

    /// Returns true if the address parsed under IPv6 rules.
    pub fn is_ipv6(&self) -> bool {
        self.addr.is_ipv6()
    }

    /// Returns true for the IPv4 private blocks `10.0.0.0/8`,
    /// `172.16.0.0/12` and `192.168.0.0/16`, and for IPv6 unique-local
    /// addresses (`fc00::/7`).
    pub fn in_private_range(&self) -> bool {
        match self.addr {
            IpAddr::V4(v4) => PRIVATE_V4_BLOCKS
                .iter()
                .any(|&(network, prefix)| v4_in_block(v4, network, prefix)),
            IpAddr::V6(v6) => PRIVATE_V6_BLOCKS
                .iter()
                .any(|&(network, prefix)| v6_in_block(v6, network, prefix)),
        }
    }

    /// Returns true for the IPv4 reserved blocks `0.0.0.0/8`, `127.0.0.0/8`,
    /// `169.254.0.0/16` and `240.0.0.0/4`, and for the IPv6 reserved blocks
    /// `::/128`, `::1/128`, `::ffff:0:0/96` and `fe80::/10`.
    pub fn in_reserved_range(&self) -> bool {
        match self.addr {
            IpAddr::V4(v4) => RESERVED_V4_BLOCKS
                .iter()
                .any(|&(network, prefix)| v4_in_block(v4, network, prefix)),
            IpAddr::V6(v6) => RESERVED_V6_BLOCKS
                .iter()
                .any(|&(network, prefix)| v6_in_block(v6, network, prefix)),
        }
    }

    /// The originally supplied text, unchanged.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed address.
    pub fn addr(&self) -> IpAddr {
        self.addr
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
