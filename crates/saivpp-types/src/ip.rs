//! Address family and IP prefix types.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// IP address family.
///
/// The dataplane calls select IPv4 or IPv6 tables either with an `is_ipv6`
/// flag or with a socket address family; both are derived from this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Returns the family of an address.
    pub const fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    /// Maximum prefix length for this family (32 or 128).
    pub const fn max_prefix_len(&self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }

    pub const fn is_ipv6(&self) -> bool {
        matches!(self, AddressFamily::Ipv6)
    }

    /// The unspecified address of this family (0.0.0.0 or ::).
    pub const fn unspecified(&self) -> IpAddr {
        match self {
            AddressFamily::Ipv4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            AddressFamily::Ipv6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "ipv4"),
            AddressFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}

/// An IP prefix in CIDR notation (e.g., 10.0.0.0/24 or 2001:db8::/32).
///
/// The address is kept as given; host bits are not cleared. Interface
/// addresses (`10.0.0.1/24`) and route prefixes (`10.0.0.0/24`) share this
/// type, and the dataplane receives exactly what the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpPrefix {
    address: IpAddr,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new IP prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length exceeds 32 for IPv4 or 128 for
    /// IPv6.
    pub fn new(address: IpAddr, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = AddressFamily::of(&address).max_prefix_len();
        if prefix_len > max_len {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for {}",
                prefix_len, max_len, address
            )));
        }

        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Creates a host prefix (/32 or /128) for an address.
    pub fn host(address: IpAddr) -> Self {
        IpPrefix {
            address,
            prefix_len: AddressFamily::of(&address).max_prefix_len(),
        }
    }

    pub const fn address(&self) -> IpAddr {
        self.address
    }

    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub const fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.address)
    }

    /// Returns true if this is a host route (/32 for IPv4, /128 for IPv6).
    pub const fn is_host(&self) -> bool {
        self.prefix_len == self.family().max_prefix_len()
    }

    /// Returns true if this is the default route (0.0.0.0/0 or ::/0).
    pub fn is_default(&self) -> bool {
        self.prefix_len == 0
    }

    /// Returns the netmask for this prefix length as an address of the same
    /// family (e.g., /24 -> 255.255.255.0).
    pub fn mask(&self) -> IpAddr {
        match self.address {
            IpAddr::V4(_) => {
                let bits = u32::MAX
                    .checked_shl(32 - u32::from(self.prefix_len))
                    .unwrap_or(0);
                IpAddr::V4(Ipv4Addr::from(bits))
            }
            IpAddr::V6(_) => {
                let bits = u128::MAX
                    .checked_shl(128 - u32::from(self.prefix_len))
                    .unwrap_or(0);
                IpAddr::V6(Ipv6Addr::from(bits))
            }
        }
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    /// Parses `addr/len`; a bare address is taken as a host prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('/') {
            Some((addr_str, len_str)) => {
                let address: IpAddr = addr_str
                    .parse()
                    .map_err(|_| ParseError::InvalidIpAddress(addr_str.to_string()))?;
                let prefix_len: u8 = len_str
                    .parse()
                    .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;
                IpPrefix::new(address, prefix_len)
            }
            None => s
                .parse::<IpAddr>()
                .map(IpPrefix::host)
                .map_err(|_| ParseError::InvalidIpAddress(s.to_string())),
        }
    }
}

impl TryFrom<String> for IpPrefix {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IpPrefix> for String {
    fn from(prefix: IpPrefix) -> String {
        prefix.to_string()
    }
}
