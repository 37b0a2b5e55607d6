use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum NetError {
    #[error("Invalid {kind} id: {id:?}")]
    InvalidId { kind: &'static str, id: String },

    #[error("Network {0:?} not found")]
    NetworkNotFound(String),

    #[error("Network {0:?} already exists")]
    NetworkExists(String),

    #[error("Endpoint {endpoint:?} not found in network {network:?}")]
    EndpointNotFound { network: String, endpoint: String },

    #[error("No free address left in subnet {subnet}")]
    AllocationExhausted { subnet: String },

    #[error("Endpoint {endpoint:?} rejected interface: {message}")]
    InterfaceRegistrationFailed {
        endpoint: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid subnet {input:?}: {message}")]
    InvalidSubnet { input: String, message: String },

    #[error("Invalid MAC address {0:?}")]
    InvalidMac(String),
}

pub type Result<T> = std::result::Result<T, NetError>;

impl NetError {
    pub fn invalid_network_id(id: &str) -> Self {
        NetError::InvalidId {
            kind: "network",
            id: id.to_string(),
        }
    }

    pub fn invalid_endpoint_id(id: &str) -> Self {
        NetError::InvalidId {
            kind: "endpoint",
            id: id.to_string(),
        }
    }

    pub fn endpoint_not_found(network: &str, endpoint: &str) -> Self {
        NetError::EndpointNotFound {
            network: network.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn interface_rejected(endpoint: &str, source: BoxError) -> Self {
        NetError::InterfaceRegistrationFailed {
            endpoint: endpoint.to_string(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn invalid_subnet(input: &str, message: impl ToString) -> Self {
        NetError::InvalidSubnet {
            input: input.to_string(),
            message: message.to_string(),
        }
    }
}
