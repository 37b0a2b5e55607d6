mod endpoint;
mod ipam;
mod mac;
mod network;
mod subnet;

pub use endpoint::*;
pub use ipam::{AddressPool, MAX_POOL_OFFSETS};
pub use mac::{MacAddr, MacGenerator, RandomMac};
pub use network::Network;
pub use subnet::Subnet;
