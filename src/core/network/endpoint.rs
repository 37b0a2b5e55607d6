use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use super::mac::MacAddr;
use crate::core::error::BoxError;

/// An attachment point of a workload interface to a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: String,
    pub mac: MacAddr,
    pub address: Ipv4Net,
    /// Whether `address` was drawn from the network's pool.
    pub allocated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub address: Ipv4Net,
    pub mac: MacAddr,
}

/// Endpoint descriptor owned by the calling controller.
#[cfg_attr(test, mockall::automock)]
pub trait EndpointInfo {
    /// Interfaces already assigned to the endpoint.
    fn interfaces(&self) -> Vec<InterfaceInfo>;

    /// Called once when the driver allocated the endpoint's interface itself.
    fn add_interface(
        &mut self,
        id: usize,
        mac: MacAddr,
        address: Ipv4Net,
        secondary: Option<Ipv4Net>,
    ) -> Result<(), BoxError>;
}

/// In-memory [`EndpointInfo`] that records every interface it is given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceList {
    pub interfaces: Vec<InterfaceInfo>,
}

impl InterfaceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interface(address: Ipv4Net, mac: MacAddr) -> Self {
        Self {
            interfaces: vec![InterfaceInfo { address, mac }],
        }
    }
}

impl EndpointInfo for InterfaceList {
    fn interfaces(&self) -> Vec<InterfaceInfo> {
        self.interfaces.clone()
    }

    fn add_interface(
        &mut self,
        id: usize,
        mac: MacAddr,
        address: Ipv4Net,
        _secondary: Option<Ipv4Net>,
    ) -> Result<(), BoxError> {
        if id != self.interfaces.len() + 1 {
            return Err(format!(
                "interface {id} out of order, expected {}",
                self.interfaces.len() + 1
            )
            .into());
        }

        self.interfaces.push(InterfaceInfo { address, mac });
        Ok(())
    }
}

/// How an endpoint gets its interface, decided once per create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceRequest {
    PreAssigned { address: Ipv4Net, mac: MacAddr },
    NeedsAllocation,
}

impl InterfaceRequest {
    pub fn from_info(info: Option<&dyn EndpointInfo>) -> Self {
        match info.and_then(|info| info.interfaces().into_iter().next()) {
            Some(iface) => InterfaceRequest::PreAssigned {
                address: iface.address,
                mac: iface.mac,
            },
            None => InterfaceRequest::NeedsAllocation,
        }
    }
}
