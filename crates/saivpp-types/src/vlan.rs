//! 802.1Q tags carried by sub-interfaces.
//!
//! `create_sub_interface` takes the tag as a bare `u16`; [`VlanId`] keeps
//! the reserved values 0 and 4095 from ever reaching it.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// A usable 802.1Q tag.
///
/// ```
/// use saivpp_types::VlanId;
///
/// let tag: VlanId = "Vlan100".parse().unwrap();
/// assert_eq!(tag.as_u16(), 100);
/// assert!(VlanId::new(4095).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Tags a sub-interface may carry. 0 means untagged and 4095 is reserved.
    pub const USABLE: RangeInclusive<u16> = 1..=4094;

    pub const fn new(tag: u16) -> Result<Self, ParseError> {
        match tag {
            1..=4094 => Ok(VlanId(tag)),
            _ => Err(ParseError::InvalidVlanId(tag)),
        }
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Accepts a bare tag (`100`) or a VLAN interface name (`Vlan100`).
impl FromStr for VlanId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = ["Vlan", "vlan"]
            .iter()
            .find_map(|prefix| s.strip_prefix(prefix))
            .unwrap_or(s);
        if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidVlanName(s.to_string()));
        }
        let tag: u16 = tag
            .parse()
            .map_err(|_| ParseError::InvalidVlanName(s.to_string()))?;
        VlanId::new(tag)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = ParseError;

    fn try_from(tag: u16) -> Result<Self, Self::Error> {
        VlanId::new(tag)
    }
}

impl From<VlanId> for u16 {
    fn from(tag: VlanId) -> u16 {
        tag.0
    }
}
