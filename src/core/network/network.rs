use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use super::{endpoint::Endpoint, ipam::AddressPool, subnet::Subnet};

/// A network with one subnet and the endpoints attached to it.
///
/// Every access to the endpoint table holds the network's lock for the whole
/// operation. The pool has its own lock and is never taken while the table
/// lock is held.
#[derive(Debug)]
pub struct Network {
    id: String,
    subnet: Subnet,
    pool: AddressPool,
    endpoints: Mutex<HashMap<String, Endpoint>>,
}

impl Network {
    pub fn new(id: &str, subnet: Subnet) -> Self {
        Self {
            id: id.to_string(),
            pool: AddressPool::new(&subnet),
            subnet,
            endpoints: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subnet(&self) -> &Subnet {
        &self.subnet
    }

    pub fn pool(&self) -> &AddressPool {
        &self.pool
    }

    pub fn lookup(&self, endpoint_id: &str) -> Option<Endpoint> {
        self.table().get(endpoint_id).cloned()
    }

    /// Inserts `endpoint`, returning the entry it replaced.
    pub fn insert(&self, endpoint: Endpoint) -> Option<Endpoint> {
        self.table().insert(endpoint.id.clone(), endpoint)
    }

    pub fn remove(&self, endpoint_id: &str) -> Option<Endpoint> {
        self.table().remove(endpoint_id)
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.table().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Endpoint>> {
        self.endpoints.lock().unwrap_or_else(|e| e.into_inner())
    }
}
