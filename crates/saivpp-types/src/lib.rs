//! Value types shared by the SAI-VPP translation layer.
//!
//! - [`AddressFamily`]: IPv4 / IPv6 selector used by VRF, neighbor and
//!   flow-hash calls
//! - [`IpPrefix`]: an address plus prefix length, as carried by route and
//!   interface address records
//! - [`MacAddress`]: 48-bit Ethernet address for neighbor entries
//! - [`VlanId`]: IEEE 802.1Q tag for sub-interfaces

mod ip;
mod mac;
mod vlan;

pub use ip::{AddressFamily, IpPrefix};
pub use mac::MacAddress;
pub use vlan::VlanId;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("invalid VLAN name: {0}")]
    InvalidVlanName(String),
}
