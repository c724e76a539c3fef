//! Network layer: configuration records and live link state.
//!
//! This module provides types and traits for:
//! - Interface configuration records ([`IpConfiguration`], [`IpAssignment`])
//! - Address/prefix values ([`Ipv4Cidr`])
//! - Live link snapshots ([`LinkSnapshot`])
//! - Taking snapshots ([`LinkProvider`])
//! - The OS-backed provider ([`platform`])

mod config;
mod link;
pub mod platform;
mod provider;

pub use config::{
    IpAssignment, IpConfiguration, Ipv4Cidr, PrefixTooLong, ProxySettings, StaticIpConfiguration,
};
pub use link::{LinkAddress, LinkSnapshot};
pub use provider::{LinkError, LinkProvider};
