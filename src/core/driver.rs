use std::{collections::HashMap, fmt, sync::Arc};

use dashmap::{mapref::entry::Entry, DashMap};
use log::{debug, info, warn};

use super::{
    error::{NetError, Result},
    network::{
        Endpoint, EndpointInfo, InterfaceRequest, MacGenerator, Network, RandomMac, Subnet,
    },
};

pub const NETWORK_TYPE: &str = "overlay";

/// Endpoint lifecycle and address allocation over a registry of networks.
pub struct Driver {
    networks: DashMap<String, Arc<Network>>,
    mac_gen: Box<dyn MacGenerator>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("networks", &self.networks)
            .field("mac_gen", &"Box<dyn MacGenerator>")
            .finish()
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    pub fn new() -> Self {
        Self::with_mac_generator(RandomMac)
    }

    pub fn with_mac_generator(mac_gen: impl MacGenerator + 'static) -> Self {
        Self {
            networks: DashMap::new(),
            mac_gen: Box::new(mac_gen),
        }
    }

    pub fn network_type(&self) -> &'static str {
        NETWORK_TYPE
    }

    pub fn create_network(&self, nid: &str, subnet: Subnet) -> Result<Arc<Network>> {
        validate_network_id(nid)?;

        match self.networks.entry(nid.to_string()) {
            Entry::Occupied(_) => Err(NetError::NetworkExists(nid.to_string())),
            Entry::Vacant(entry) => {
                let network = Arc::new(Network::new(nid, subnet));
                entry.insert(Arc::clone(&network));

                info!("[Driver]: Network {nid} created with subnet {subnet}");
                Ok(network)
            }
        }
    }

    pub fn delete_network(&self, nid: &str) -> Result<()> {
        validate_network_id(nid)?;

        let (_, network) = self
            .networks
            .remove(nid)
            .ok_or_else(|| NetError::NetworkNotFound(nid.to_string()))?;

        if !network.is_empty() {
            warn!(
                "[Driver]: Network {nid} deleted with {} live endpoints",
                network.len()
            );
        }

        info!("[Driver]: Network {nid} deleted");
        Ok(())
    }

    pub fn network(&self, nid: &str) -> Option<Arc<Network>> {
        self.networks.get(nid).map(|n| Arc::clone(n.value()))
    }

    /// All registered networks, ordered by id.
    pub fn networks(&self) -> Vec<Arc<Network>> {
        let mut networks: Vec<_> = self
            .networks
            .iter()
            .map(|n| Arc::clone(n.value()))
            .collect();
        networks.sort_by(|a, b| a.id().cmp(b.id()));

        networks
    }

    pub fn create_endpoint(
        &self,
        nid: &str,
        eid: &str,
        info: Option<&mut dyn EndpointInfo>,
    ) -> Result<()> {
        validate_ids(nid, eid)?;
        let network = self.resolve(nid)?;

        let request = InterfaceRequest::from_info(info.as_deref());
        let endpoint = match request {
            InterfaceRequest::PreAssigned { address, mac } => {
                debug!("[Driver]: Endpoint {eid} uses pre-assigned address {address}");

                Endpoint {
                    id: eid.to_string(),
                    mac,
                    address,
                    allocated: false,
                }
            }
            InterfaceRequest::NeedsAllocation => self.allocate_endpoint(&network, eid, info)?,
        };

        let address = endpoint.address;
        if let Some(replaced) = network.insert(endpoint) {
            warn!("[Driver]: Endpoint {eid} in network {nid} replaced an existing entry");
            release_endpoint(&network, &replaced);
        }

        info!("[Driver]: Endpoint {eid} created in network {nid} with address {address}");
        Ok(())
    }

    pub fn delete_endpoint(&self, nid: &str, eid: &str) -> Result<()> {
        validate_ids(nid, eid)?;
        let network = self.resolve(nid)?;

        // Removing first makes the endpoint unreachable to a concurrent delete
        // before its offset goes back to the pool.
        let endpoint = network
            .remove(eid)
            .ok_or_else(|| NetError::endpoint_not_found(nid, eid))?;
        release_endpoint(&network, &endpoint);

        info!("[Driver]: Endpoint {eid} deleted from network {nid}");
        Ok(())
    }

    pub fn endpoint(&self, nid: &str, eid: &str) -> Result<Endpoint> {
        validate_ids(nid, eid)?;

        self.resolve(nid)?
            .lookup(eid)
            .ok_or_else(|| NetError::endpoint_not_found(nid, eid))
    }

    pub fn endpoints(&self, nid: &str) -> Result<Vec<Endpoint>> {
        validate_network_id(nid)?;

        let mut endpoints = self.resolve(nid)?.endpoints();
        endpoints.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(endpoints)
    }

    /// Operational data of an endpoint. Nothing is reported yet.
    pub fn endpoint_oper_info(
        &self,
        _nid: &str,
        _eid: &str,
    ) -> HashMap<String, serde_json::Value> {
        HashMap::new()
    }

    fn resolve(&self, nid: &str) -> Result<Arc<Network>> {
        self.network(nid)
            .ok_or_else(|| NetError::NetworkNotFound(nid.to_string()))
    }

    fn allocate_endpoint(
        &self,
        network: &Network,
        eid: &str,
        info: Option<&mut dyn EndpointInfo>,
    ) -> Result<Endpoint> {
        let offset = network.pool().allocate()?;
        let address = network.subnet().address_at(offset);
        let mac = self.mac_gen.generate();

        if let Some(info) = info {
            if let Err(e) = info.add_interface(1, mac, address, None) {
                network.pool().release(offset);
                return Err(NetError::interface_rejected(eid, e));
            }
        }

        debug!("[Driver]: Endpoint {eid} allocated offset {offset} ({address}, {mac})");
        Ok(Endpoint {
            id: eid.to_string(),
            mac,
            address,
            allocated: true,
        })
    }
}

fn release_endpoint(network: &Network, endpoint: &Endpoint) {
    if !endpoint.allocated {
        debug!(
            "[Driver]: Endpoint {} address {} was not pool-allocated, nothing to release",
            endpoint.id, endpoint.address
        );
        return;
    }

    let offset = network.subnet().offset_of(endpoint.address.addr());
    network.pool().release(offset);
}

fn validate_ids(nid: &str, eid: &str) -> Result<()> {
    validate_network_id(nid)?;

    if !is_valid_id(eid) {
        return Err(NetError::invalid_endpoint_id(eid));
    }
    Ok(())
}

fn validate_network_id(nid: &str) -> Result<()> {
    if !is_valid_id(nid) {
        return Err(NetError::invalid_network_id(nid));
    }
    Ok(())
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && !id.chars().any(|c| c.is_whitespace() || c.is_control())
}
