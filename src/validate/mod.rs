//! Validation of user-supplied network input.
//!
//! Everything here is pure: no DNS lookups, no reachability checks, and the
//! same input always yields the same result. Errors are data; their
//! `Display` output is the message shown next to the offending field.

mod form;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use form::{Field, FormErrors, StaticForm, validate_static_form};

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::network::Ipv4Cidr;

/// Reason a single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Not an IPv4 dotted-quad literal.
    #[error("Invalid IP address '{value}'")]
    InvalidAddress {
        /// The rejected input.
        value: String,
    },

    /// Prefix missing, non-numeric, or above 32.
    #[error("Invalid prefix length in '{value}': expected /0 to /32")]
    InvalidPrefixLength {
        /// The rejected input.
        value: String,
    },

    /// Gateway not reachable on-link from the configured address.
    #[error("Gateway {gateway} is outside subnet {network}")]
    GatewayOutsideSubnet {
        /// The gateway address.
        gateway: Ipv4Addr,
        /// The interface address and prefix.
        network: Ipv4Cidr,
    },

    /// No DNS server left after splitting the list.
    #[error("At least one DNS server is required")]
    EmptyDnsList,

    /// Required field left blank.
    #[error("This field cannot be empty")]
    EmptyField,
}

/// Validates an IPv4 address literal.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidAddress`] unless `candidate` is four
/// decimal octets in 0..=255 separated by dots, with nothing else around them.
pub fn validate_ip(candidate: &str) -> Result<Ipv4Addr, ValidationError> {
    candidate
        .parse::<Ipv4Addr>()
        .map_err(|_| ValidationError::InvalidAddress {
            value: candidate.to_string(),
        })
}

/// Validates an `a.b.c.d/n` address with prefix length.
///
/// # Errors
///
/// - [`ValidationError::InvalidAddress`] if the address part is invalid
/// - [`ValidationError::InvalidPrefixLength`] if the prefix is absent,
///   contains anything but ASCII digits, or exceeds 32
pub fn validate_ip_with_mask(candidate: &str) -> Result<Ipv4Cidr, ValidationError> {
    let (address, prefix) = candidate.split_once('/').unwrap_or((candidate, ""));
    let address = validate_ip(address).map_err(|_| ValidationError::InvalidAddress {
        value: candidate.to_string(),
    })?;

    let invalid_prefix = || ValidationError::InvalidPrefixLength {
        value: candidate.to_string(),
    };
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_prefix());
    }
    let prefix_len = prefix.parse::<u8>().map_err(|_| invalid_prefix())?;

    Ipv4Cidr::new(address, prefix_len).map_err(|_| invalid_prefix())
}

/// Validates a gateway against the subnet of the interface address.
///
/// # Errors
///
/// - [`ValidationError::InvalidAddress`] if `gateway` is not an IPv4 literal
/// - [`ValidationError::GatewayOutsideSubnet`] if it lies outside `network`
pub fn validate_gateway(gateway: &str, network: Ipv4Cidr) -> Result<Ipv4Addr, ValidationError> {
    let gateway = validate_ip(gateway)?;
    if network.contains(gateway) {
        Ok(gateway)
    } else {
        Err(ValidationError::GatewayOutsideSubnet { gateway, network })
    }
}

/// Validates a comma-separated DNS server list.
///
/// Entries are trimmed and blank entries skipped, so `"8.8.8.8, 1.1.1.1,"`
/// is accepted. One malformed entry rejects the whole list.
///
/// # Errors
///
/// - [`ValidationError::InvalidAddress`] for the first malformed entry
/// - [`ValidationError::EmptyDnsList`] if no entries remain
pub fn validate_dns_list(text: &str) -> Result<Vec<Ipv4Addr>, ValidationError> {
    let servers = text
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(validate_ip)
        .collect::<Result<Vec<_>, _>>()?;

    if servers.is_empty() {
        return Err(ValidationError::EmptyDnsList);
    }
    Ok(servers)
}
