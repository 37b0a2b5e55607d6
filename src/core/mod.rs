mod config;
mod driver;
mod error;
pub mod network;

pub use config::{DriverConfig, NetworkConfig, Operation};
pub use driver::{Driver, NETWORK_TYPE};
pub use error::{BoxError, NetError, Result};
