use std::{fs, path::Path, str::FromStr};

use anyhow::Context;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use super::{
    driver::Driver,
    network::{InterfaceInfo, MacAddr, Subnet},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub id: String,
    pub subnet: Ipv4Net,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Create {
        network: String,
        endpoint: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        address: Option<Ipv4Net>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mac: Option<MacAddr>,
    },
    Delete {
        network: String,
        endpoint: String,
    },
}

impl Operation {
    /// The caller-supplied interface of a create, if any.
    pub fn interface(&self) -> anyhow::Result<Option<InterfaceInfo>> {
        match self {
            Operation::Create {
                address: Some(address),
                mac: Some(mac),
                ..
            } => Ok(Some(InterfaceInfo {
                address: *address,
                mac: *mac,
            })),
            Operation::Create {
                endpoint,
                address: None,
                mac: Some(_),
                ..
            }
            | Operation::Create {
                endpoint,
                address: Some(_),
                mac: None,
                ..
            } => Err(anyhow::anyhow!(
                "Endpoint {endpoint} needs both address and mac, or neither"
            )),
            _ => Ok(None),
        }
    }
}

/// Networks to register and endpoint operations to apply, read from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub networks: Vec<NetworkConfig>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl DriverConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        contents
            .parse()
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn build_driver(&self) -> anyhow::Result<Driver> {
        let driver = Driver::new();

        for net in &self.networks {
            driver
                .create_network(&net.id, Subnet::new(net.subnet))
                .with_context(|| format!("Failed to register network {}", net.id))?;
        }

        for op in &self.operations {
            op.interface()?;
        }

        Ok(driver)
    }
}

impl FromStr for DriverConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}
