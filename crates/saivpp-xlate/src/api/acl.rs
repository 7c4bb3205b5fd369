//! Access control lists.
//!
//! An ACL is a name plus an ordered rule sequence. Programming it yields an
//! [`AclIndex`]; that index is the only handle the engine gives back, so
//! bind, unbind, replace and delete all need the caller to have kept it.

use crate::api::check;
use crate::dataplane::Dataplane;
use crate::error::{XlateError, XlateResult};
use crate::types::AclIndex;
use saivpp_types::{AddressFamily, IpPrefix};
use std::net::IpAddr;
use tracing::info;

/// Rule action (`vpp_acl_action_e`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AclAction {
    #[default]
    Deny,
    Permit,
    /// Permit and create session state for return traffic.
    PermitStateful,
}

impl AclAction {
    pub const fn as_raw(&self) -> u32 {
        match self {
            AclAction::Deny => 0,
            AclAction::Permit => 1,
            AclAction::PermitStateful => 2,
        }
    }
}

/// Address match: an address and the mask applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddrMatch {
    pub addr: IpAddr,
    pub mask: IpAddr,
}

impl AddrMatch {
    /// Matches any address of the family.
    pub const fn any(family: AddressFamily) -> Self {
        Self {
            addr: family.unspecified(),
            mask: family.unspecified(),
        }
    }

    pub fn from_prefix(prefix: IpPrefix) -> Self {
        Self {
            addr: prefix.address(),
            mask: prefix.mask(),
        }
    }

    /// Family of the match, or `None` if address and mask disagree.
    pub fn family(&self) -> Option<AddressFamily> {
        let family = AddressFamily::of(&self.addr);
        (AddressFamily::of(&self.mask) == family).then_some(family)
    }
}

/// Inclusive port range. For ICMP rules the source range carries the ICMP
/// type and the destination range the ICMP code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    pub first: u16,
    pub last: u16,
}

impl PortRange {
    pub const ANY: PortRange = PortRange {
        first: 0,
        last: u16::MAX,
    };

    pub const fn single(port: u16) -> Self {
        Self {
            first: port,
            last: port,
        }
    }

    pub const fn new(first: u16, last: u16) -> Self {
        Self { first, last }
    }
}

impl Default for PortRange {
    fn default() -> Self {
        PortRange::ANY
    }
}

/// One ACL rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AclRule {
    pub action: AclAction,
    pub src: AddrMatch,
    pub dst: AddrMatch,
    /// IP protocol number, 0 for any.
    pub proto: u8,
    pub src_ports: PortRange,
    pub dst_ports: PortRange,
    pub tcp_flags_mask: u8,
    pub tcp_flags_value: u8,
}

impl AclRule {
    /// A rule matching all traffic of a family.
    pub const fn new(action: AclAction, family: AddressFamily) -> Self {
        Self {
            action,
            src: AddrMatch::any(family),
            dst: AddrMatch::any(family),
            proto: 0,
            src_ports: PortRange::ANY,
            dst_ports: PortRange::ANY,
            tcp_flags_mask: 0,
            tcp_flags_value: 0,
        }
    }

    pub fn src(mut self, prefix: IpPrefix) -> Self {
        self.src = AddrMatch::from_prefix(prefix);
        self
    }

    pub fn dst(mut self, prefix: IpPrefix) -> Self {
        self.dst = AddrMatch::from_prefix(prefix);
        self
    }

    pub fn proto(mut self, proto: u8) -> Self {
        self.proto = proto;
        self
    }

    pub fn src_ports(mut self, range: PortRange) -> Self {
        self.src_ports = range;
        self
    }

    pub fn dst_ports(mut self, range: PortRange) -> Self {
        self.dst_ports = range;
        self
    }

    pub fn tcp_flags(mut self, mask: u8, value: u8) -> Self {
        self.tcp_flags_mask = mask;
        self.tcp_flags_value = value;
        self
    }

    /// The family both address matches share. `None` for a rule mixing
    /// IPv4 and IPv6, which the engine cannot express.
    pub fn family(&self) -> Option<AddressFamily> {
        let family = self.src.family()?;
        (self.dst.family()? == family).then_some(family)
    }
}

/// A named, ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Acl {
    pub name: String,
    pub rules: Vec<AclRule>,
}

impl Acl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: AclRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Fails on the first rule that mixes address families.
    pub fn check_families(&self) -> XlateResult<()> {
        match self.rules.iter().position(|rule| rule.family().is_none()) {
            Some(pos) => Err(XlateError::invalid_parameter(format!(
                "ACL {} rule {} mixes IPv4 and IPv6 addresses",
                self.name, pos
            ))),
            None => Ok(()),
        }
    }
}

/// Traffic direction an ACL is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclDirection {
    Ingress,
    Egress,
}

impl AclDirection {
    pub const fn is_input(&self) -> bool {
        matches!(self, AclDirection::Ingress)
    }
}

/// ACL programming.
pub struct AclApi<'a, D: ?Sized> {
    dataplane: &'a D,
}

impl<'a, D: Dataplane + ?Sized> AclApi<'a, D> {
    pub fn new(dataplane: &'a D) -> Self {
        Self { dataplane }
    }

    /// Programs a new ACL and returns the engine-issued index.
    pub fn add(&self, acl: &Acl) -> XlateResult<AclIndex> {
        acl.check_families()?;
        let mut index = 0;
        check(
            "vpp_acl_add_replace",
            self.dataplane.acl_add_replace(acl, &mut index, false)?,
        )?;
        let index = AclIndex::from_raw(index);
        info!(
            "Added ACL {} with {} rule(s) as {}",
            acl.name,
            acl.rule_count(),
            index
        );
        Ok(index)
    }

    /// Replaces the rules of an existing ACL in place.
    pub fn replace(&self, index: AclIndex, acl: &Acl) -> XlateResult<AclIndex> {
        acl.check_families()?;
        let mut raw = index.as_raw();
        check(
            "vpp_acl_add_replace",
            self.dataplane.acl_add_replace(acl, &mut raw, true)?,
        )?;
        let index = AclIndex::from_raw(raw);
        info!(
            "Replaced ACL {} ({}) with {} rule(s)",
            acl.name,
            index,
            acl.rule_count()
        );
        Ok(index)
    }

    pub fn delete(&self, index: AclIndex) -> XlateResult<()> {
        check("vpp_acl_del", self.dataplane.acl_del(index.as_raw())?)?;
        info!("Deleted ACL {}", index);
        Ok(())
    }

    pub fn bind(
        &self,
        hwif_name: &str,
        index: AclIndex,
        direction: AclDirection,
    ) -> XlateResult<()> {
        check(
            "vpp_acl_interface_bind",
            self.dataplane
                .acl_interface_bind(hwif_name, index.as_raw(), direction.is_input())?,
        )?;
        info!("Bound {} to {} ({:?})", index, hwif_name, direction);
        Ok(())
    }

    pub fn unbind(
        &self,
        hwif_name: &str,
        index: AclIndex,
        direction: AclDirection,
    ) -> XlateResult<()> {
        check(
            "vpp_acl_interface_unbind",
            self.dataplane
                .acl_interface_unbind(hwif_name, index.as_raw(), direction.is_input())?,
        )?;
        info!("Unbound {} from {} ({:?})", index, hwif_name, direction);
        Ok(())
    }
}
