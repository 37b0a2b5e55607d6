use std::{fmt, net::Ipv4Addr, str::FromStr};

use ipnet::Ipv4Net;

use crate::core::error::{NetError, Result};

/// An IPv4 subnet whose base carries no host bits.
///
/// Host offsets are encoded as a big-endian addition onto the base address and
/// decoded by the matching subtraction, so `offset_of(address_at(n)) == n` for
/// every offset inside the subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    net: Ipv4Net,
}

impl Subnet {
    pub fn new(net: Ipv4Net) -> Self {
        Self { net: net.trunc() }
    }

    pub fn base(&self) -> Ipv4Addr {
        self.net.network()
    }

    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    pub fn netmask(&self) -> Ipv4Addr {
        self.net.netmask()
    }

    pub fn as_net(&self) -> Ipv4Net {
        self.net
    }

    /// Number of usable hosts, excluding the network and broadcast addresses.
    pub fn host_capacity(&self) -> u64 {
        let total = 1u64 << (32 - u32::from(self.prefix_len()));
        total.saturating_sub(2)
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.net.contains(&ip)
    }

    pub fn address_at(&self, offset: u32) -> Ipv4Net {
        let host = u32::from(self.base()).wrapping_add(offset);

        // Prefix comes from an existing Ipv4Net, always <= 32.
        Ipv4Net::new(Ipv4Addr::from(host), self.prefix_len()).unwrap_or(self.net)
    }

    pub fn offset_of(&self, ip: Ipv4Addr) -> u32 {
        u32::from(ip).wrapping_sub(u32::from(self.base()))
    }
}

impl FromStr for Subnet {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self> {
        let net = s
            .trim()
            .parse::<Ipv4Net>()
            .map_err(|e| NetError::invalid_subnet(s, e))?;

        Ok(Self::new(net))
    }
}

impl From<Ipv4Net> for Subnet {
    fn from(net: Ipv4Net) -> Self {
        Self::new(net)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}
