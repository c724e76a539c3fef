//! ethcfg: Ethernet configuration manager
//!
//! A library for reconciling stored Ethernet configuration with live link
//! state, validating static configuration input, and probing internet
//! reachability.

pub mod config;
pub mod gateway;
pub mod monitor;
pub mod network;
pub mod probe;
pub mod reconcile;
pub mod session;
pub mod validate;
