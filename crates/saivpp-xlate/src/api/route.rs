//! Routes, interface addresses and ECMP flow hashing.

use crate::api::check;
use crate::dataplane::Dataplane;
use crate::error::XlateResult;
use crate::types::VrfId;
use bitflags::bitflags;
use saivpp_types::{AddressFamily, IpPrefix};
use std::net::IpAddr;
use tracing::info;

/// How the dataplane resolves a next-hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NextHopType {
    /// Forward to the next-hop address.
    #[default]
    Normal,
    /// Deliver locally (receive route).
    Local,
}

impl NextHopType {
    /// Value of `vpp_nexthop_type_e`.
    pub const fn as_raw(&self) -> u32 {
        match self {
            NextHopType::Normal => 1,
            NextHopType::Local => 2,
        }
    }
}

/// A candidate forwarding destination for a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NextHop {
    pub addr: IpAddr,
    /// Egress interface; `None` leaves resolution to the dataplane.
    pub hwif_name: Option<String>,
    pub weight: u8,
    pub preference: u8,
    pub kind: NextHopType,
    pub flags: u32,
}

impl NextHop {
    pub fn new(addr: IpAddr) -> Self {
        Self {
            addr,
            hwif_name: None,
            weight: 1,
            preference: 0,
            kind: NextHopType::Normal,
            flags: 0,
        }
    }

    /// A next-hop delivering to the local stack.
    pub fn local(family: AddressFamily) -> Self {
        Self {
            kind: NextHopType::Local,
            ..Self::new(family.unspecified())
        }
    }

    pub fn via(mut self, hwif_name: impl Into<String>) -> Self {
        self.hwif_name = Some(hwif_name.into());
        self
    }

    pub fn weight(mut self, weight: u8) -> Self {
        self.weight = weight;
        self
    }

    pub fn preference(mut self, preference: u8) -> Self {
        self.preference = preference;
        self
    }
}

/// A route: prefix, table and ordered next-hop set.
///
/// The next-hop count and the multipath flag are derived from `next_hops`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IpRoute {
    pub prefix: IpPrefix,
    pub vrf_id: VrfId,
    pub next_hops: Vec<NextHop>,
}

impl IpRoute {
    pub fn new(prefix: IpPrefix) -> Self {
        Self {
            prefix,
            vrf_id: VrfId::DEFAULT,
            next_hops: Vec::new(),
        }
    }

    pub fn in_vrf(mut self, vrf_id: VrfId) -> Self {
        self.vrf_id = vrf_id;
        self
    }

    pub fn with_next_hop(mut self, next_hop: NextHop) -> Self {
        self.next_hops.push(next_hop);
        self
    }

    pub fn next_hop_count(&self) -> usize {
        self.next_hops.len()
    }

    pub fn is_multipath(&self) -> bool {
        self.next_hops.len() > 1
    }
}

bitflags! {
    /// Fields hashed for ECMP path selection (`vpp_ip_flow_hash_mask_e`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FlowHash: u32 {
        const SRC_IP = 1;
        const DST_IP = 2;
        const SRC_PORT = 4;
        const DST_PORT = 8;
        const PROTO = 16;
        const REVERSE = 32;
        const SYMMETRIC = 64;
        const FLOW_LABEL = 128;
    }
}

impl FlowHash {
    /// Source/destination address, ports and protocol.
    pub const FIVE_TUPLE: FlowHash = FlowHash::from_bits_retain(1 | 2 | 4 | 8 | 16);
}

/// Route and address programming.
pub struct RouteApi<'a, D: ?Sized> {
    dataplane: &'a D,
}

impl<'a, D: Dataplane + ?Sized> RouteApi<'a, D> {
    pub fn new(dataplane: &'a D) -> Self {
        Self { dataplane }
    }

    /// Installs a route.
    ///
    /// A multipath route is handed over in one call; whether its next-hops
    /// are applied atomically is up to the dataplane.
    pub fn add_route(&self, route: &IpRoute) -> XlateResult<()> {
        check(
            "ip_route_add_del",
            self.dataplane.ip_route_add_del(route, true)?,
        )?;
        info!(
            "Added route {} in {} with {} next-hop(s)",
            route.prefix,
            route.vrf_id,
            route.next_hop_count()
        );
        Ok(())
    }

    /// Withdraws a route.
    pub fn del_route(&self, route: &IpRoute) -> XlateResult<()> {
        check(
            "ip_route_add_del",
            self.dataplane.ip_route_add_del(route, false)?,
        )?;
        info!("Removed route {} in {}", route.prefix, route.vrf_id);
        Ok(())
    }

    /// Assigns an address to an interface.
    pub fn add_interface_address(&self, hwif_name: &str, prefix: IpPrefix) -> XlateResult<()> {
        self.interface_address(hwif_name, prefix, true)?;
        info!("Added address {} on {}", prefix, hwif_name);
        Ok(())
    }

    /// Removes an address from an interface.
    pub fn del_interface_address(&self, hwif_name: &str, prefix: IpPrefix) -> XlateResult<()> {
        self.interface_address(hwif_name, prefix, false)?;
        info!("Removed address {} from {}", prefix, hwif_name);
        Ok(())
    }

    fn interface_address(
        &self,
        hwif_name: &str,
        prefix: IpPrefix,
        is_add: bool,
    ) -> XlateResult<()> {
        let record = IpRoute::new(prefix);
        check(
            "interface_ip_address_add_del",
            self.dataplane
                .interface_ip_address_add_del(hwif_name, &record, is_add)?,
        )
    }

    /// Sets the ECMP hash fields of a VRF for one address family.
    pub fn set_flow_hash(
        &self,
        vrf_id: VrfId,
        family: AddressFamily,
        mask: FlowHash,
    ) -> XlateResult<()> {
        check(
            "vpp_ip_flow_hash_set",
            self.dataplane
                .ip_flow_hash_set(vrf_id.as_raw(), mask, family)?,
        )?;
        info!(
            "Set {} flow hash of {} to {:#x}",
            family,
            vrf_id,
            mask.bits()
        );
        Ok(())
    }
}
