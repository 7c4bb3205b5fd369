//! Interface configuration.
//!
//! Interfaces are named by their dataplane (hardware) name, e.g.
//! `Ethernet0`. Every call is applied synchronously: success means the
//! engine holds the new state.

use crate::api::check;
use crate::dataplane::Dataplane;
use crate::error::{VppStatus, XlateError, XlateResult};
use crate::types::{SwIfIndex, VrfId};
use saivpp_types::{AddressFamily, VlanId};
use tracing::{info, warn};

/// Per-protocol MTU slot of a software interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MtuType {
    #[default]
    L3,
    Ip4,
    Ip6,
    Mpls,
}

impl MtuType {
    pub const fn as_raw(&self) -> i32 {
        match self {
            MtuType::L3 => 0,
            MtuType::Ip4 => 1,
            MtuType::Ip6 => 2,
            MtuType::Mpls => 3,
        }
    }
}

/// Interface configuration calls.
pub struct InterfaceApi<'a, D: ?Sized> {
    dataplane: &'a D,
}

impl<'a, D: Dataplane + ?Sized> InterfaceApi<'a, D> {
    pub fn new(dataplane: &'a D) -> Self {
        Self { dataplane }
    }

    /// Pairs a dataplane interface with a kernel-visible host interface.
    pub fn configure_lcp(&self, hwif_name: &str, hostif_name: &str) -> XlateResult<()> {
        check(
            "configure_lcp_interface",
            self.dataplane
                .configure_lcp_interface(hwif_name, hostif_name, true)?,
        )?;
        info!("Paired {} with host interface {}", hwif_name, hostif_name);
        Ok(())
    }

    /// Removes a host interface pairing.
    pub fn remove_lcp(&self, hwif_name: &str, hostif_name: &str) -> XlateResult<()> {
        check(
            "configure_lcp_interface",
            self.dataplane
                .configure_lcp_interface(hwif_name, hostif_name, false)?,
        )?;
        info!("Unpaired {} from host interface {}", hwif_name, hostif_name);
        Ok(())
    }

    pub fn create_loopback(&self, hwif_name: &str, instance: u32) -> XlateResult<()> {
        check(
            "create_loopback_instance",
            self.dataplane.create_loopback_instance(hwif_name, instance)?,
        )?;
        info!("Created loopback {} (instance {})", hwif_name, instance);
        Ok(())
    }

    pub fn delete_loopback(&self, hwif_name: &str, instance: u32) -> XlateResult<()> {
        check(
            "delete_loopback",
            self.dataplane.delete_loopback(hwif_name, instance)?,
        )?;
        info!("Deleted loopback {} (instance {})", hwif_name, instance);
        Ok(())
    }

    /// Looks up the dataplane index of an interface by name.
    ///
    /// The engine answers with a non-negative index or a negative status.
    pub fn sw_if_index(&self, ifname: &str) -> XlateResult<SwIfIndex> {
        let raw = self.dataplane.get_sw_if_idx(ifname)?;
        if raw < 0 {
            let status = VppStatus::from_raw(raw);
            warn!("get_sw_if_idx({}) failed with status {}", ifname, status);
            return Err(XlateError::Status {
                op: "get_sw_if_idx",
                status,
            });
        }
        Ok(SwIfIndex::from_raw(raw.unsigned_abs()))
    }

    /// Creates a VLAN sub-interface `sub_id` on `hwif_name`.
    pub fn create_sub_interface(
        &self,
        hwif_name: &str,
        sub_id: u32,
        vlan: VlanId,
    ) -> XlateResult<()> {
        check(
            "create_sub_interface",
            self.dataplane
                .create_sub_interface(hwif_name, sub_id, vlan.as_u16())?,
        )?;
        info!("Created sub-interface {}.{} (vlan {})", hwif_name, sub_id, vlan);
        Ok(())
    }

    pub fn delete_sub_interface(&self, hwif_name: &str, sub_id: u32) -> XlateResult<()> {
        check(
            "delete_sub_interface",
            self.dataplane.delete_sub_interface(hwif_name, sub_id)?,
        )?;
        info!("Deleted sub-interface {}.{}", hwif_name, sub_id);
        Ok(())
    }

    /// Binds an interface (or sub-interface, `sub_id` != 0) to a VRF table.
    pub fn set_vrf(
        &self,
        hwif_name: &str,
        sub_id: u32,
        vrf_id: VrfId,
        family: AddressFamily,
    ) -> XlateResult<()> {
        check(
            "set_interface_vrf",
            self.dataplane.set_interface_vrf(
                hwif_name,
                sub_id,
                vrf_id.as_raw(),
                family.is_ipv6(),
            )?,
        )?;
        info!("Bound {} ({}) to {} for {}", hwif_name, sub_id, vrf_id, family);
        Ok(())
    }

    pub fn set_admin_state(&self, hwif_name: &str, up: bool) -> XlateResult<()> {
        check(
            "interface_set_state",
            self.dataplane.interface_set_state(hwif_name, up)?,
        )?;
        info!(
            "Set {} admin {}",
            hwif_name,
            if up { "up" } else { "down" }
        );
        Ok(())
    }

    /// Sets the hardware (link) MTU.
    pub fn set_hw_mtu(&self, hwif_name: &str, mtu: u32) -> XlateResult<()> {
        check(
            "hw_interface_set_mtu",
            self.dataplane.hw_interface_set_mtu(hwif_name, mtu)?,
        )?;
        info!("Set {} hardware MTU to {}", hwif_name, mtu);
        Ok(())
    }

    /// Sets one per-protocol MTU of the software interface.
    pub fn set_sw_mtu(&self, hwif_name: &str, mtu: u32, mtu_type: MtuType) -> XlateResult<()> {
        check(
            "sw_interface_set_mtu",
            self.dataplane
                .sw_interface_set_mtu(hwif_name, mtu, mtu_type)?,
        )?;
        info!("Set {} {:?} MTU to {}", hwif_name, mtu_type, mtu);
        Ok(())
    }

    /// Returns true if the link is up.
    pub fn link_state(&self, hwif_name: &str) -> XlateResult<bool> {
        let mut link_up = false;
        check(
            "interface_get_state",
            self.dataplane.interface_get_state(hwif_name, &mut link_up)?,
        )?;
        Ok(link_up)
    }
}
