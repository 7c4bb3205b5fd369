//! Neighbor (ARP / ND) entries.

use crate::api::check;
use crate::dataplane::Dataplane;
use crate::error::XlateResult;
use saivpp_types::MacAddress;
use std::net::IpAddr;
use tracing::info;

/// An IP-to-MAC binding on an interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Neighbor {
    pub hwif_name: String,
    pub ip: IpAddr,
    pub mac: MacAddress,
    pub is_static: bool,
}

impl Neighbor {
    pub fn new(hwif_name: impl Into<String>, ip: IpAddr, mac: MacAddress) -> Self {
        Self {
            hwif_name: hwif_name.into(),
            ip,
            mac,
            is_static: false,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
}

/// Neighbor programming. IPv4 and IPv6 entries go to separate engine calls.
pub struct NeighborApi<'a, D: ?Sized> {
    dataplane: &'a D,
}

impl<'a, D: Dataplane + ?Sized> NeighborApi<'a, D> {
    pub fn new(dataplane: &'a D) -> Self {
        Self { dataplane }
    }

    pub fn add(&self, neighbor: &Neighbor) -> XlateResult<()> {
        self.add_del(neighbor, true)?;
        info!(
            "Added neighbor {} -> {} on {}",
            neighbor.ip, neighbor.mac, neighbor.hwif_name
        );
        Ok(())
    }

    pub fn del(&self, neighbor: &Neighbor) -> XlateResult<()> {
        self.add_del(neighbor, false)?;
        info!("Removed neighbor {} on {}", neighbor.ip, neighbor.hwif_name);
        Ok(())
    }

    fn add_del(&self, neighbor: &Neighbor, is_add: bool) -> XlateResult<()> {
        match neighbor.ip {
            IpAddr::V4(addr) => check(
                "ip4_nbr_add_del",
                self.dataplane.ip4_nbr_add_del(
                    &neighbor.hwif_name,
                    addr,
                    neighbor.is_static,
                    &neighbor.mac,
                    is_add,
                )?,
            ),
            IpAddr::V6(addr) => check(
                "ip6_nbr_add_del",
                self.dataplane.ip6_nbr_add_del(
                    &neighbor.hwif_name,
                    addr,
                    neighbor.is_static,
                    &neighbor.mac,
                    is_add,
                )?,
            ),
        }
    }
}
