pub mod core;
pub mod front;

// Re-export commonly used types for integration tests
pub use crate::core::network::{
    Endpoint, EndpointInfo, InterfaceInfo, InterfaceList, MacAddr, MacGenerator, Network,
    RandomMac, Subnet,
};
pub use crate::core::{Driver, DriverConfig, NetError, Operation};
