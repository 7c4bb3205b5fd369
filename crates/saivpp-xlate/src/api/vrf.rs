//! VRF tables.

use crate::api::check;
use crate::dataplane::Dataplane;
use crate::error::XlateResult;
use crate::types::VrfId;
use saivpp_types::AddressFamily;
use tracing::info;

/// VRF table creation and removal. Tables exist per address family.
pub struct VrfApi<'a, D: ?Sized> {
    dataplane: &'a D,
}

impl<'a, D: Dataplane + ?Sized> VrfApi<'a, D> {
    pub fn new(dataplane: &'a D) -> Self {
        Self { dataplane }
    }

    pub fn add(&self, vrf_id: VrfId, name: &str, family: AddressFamily) -> XlateResult<()> {
        check(
            "ip_vrf_add",
            self.dataplane
                .ip_vrf_add(vrf_id.as_raw(), name, family.is_ipv6())?,
        )?;
        info!("Created {} table {} ({})", family, vrf_id, name);
        Ok(())
    }

    pub fn del(&self, vrf_id: VrfId, name: &str, family: AddressFamily) -> XlateResult<()> {
        check(
            "ip_vrf_del",
            self.dataplane
                .ip_vrf_del(vrf_id.as_raw(), name, family.is_ipv6())?,
        )?;
        info!("Deleted {} table {} ({})", family, vrf_id, name);
        Ok(())
    }
}
