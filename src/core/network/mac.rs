use std::{fmt, str::FromStr};

use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::core::error::NetError;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_unicast(&self) -> bool {
        self.0[0] & 0x01 == 0
    }

    pub fn is_local(&self) -> bool {
        self.0[0] & 0x02 != 0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({self})")
    }
}

impl FromStr for MacAddr {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.trim().split([':', '-']);

        for octet in octets.iter_mut() {
            let part = parts
                .next()
                .filter(|p| p.len() == 2)
                .ok_or_else(|| NetError::InvalidMac(s.to_string()))?;
            *octet =
                u8::from_str_radix(part, 16).map_err(|_| NetError::InvalidMac(s.to_string()))?;
        }

        if parts.next().is_some() {
            return Err(NetError::InvalidMac(s.to_string()));
        }

        Ok(MacAddr(octets))
    }
}

impl TryFrom<String> for MacAddr {
    type Error = NetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddr> for String {
    fn from(mac: MacAddr) -> Self {
        mac.to_string()
    }
}

/// Source of hardware addresses for driver-allocated endpoints.
pub trait MacGenerator: Send + Sync {
    fn generate(&self) -> MacAddr;
}

/// Random unicast, locally administered addresses.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomMac;

impl MacGenerator for RandomMac {
    fn generate(&self) -> MacAddr {
        let mut octets: [u8; 6] = thread_rng().gen();

        octets[0] &= 0xfe; // unicast
        octets[0] |= 0x02; // locally administered

        MacAddr(octets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_random_mac_is_local_unicast() {
        for _ in 0..256 {
            let mac = RandomMac.generate();
            assert!(mac.is_unicast(), "{mac} is multicast");
            assert!(mac.is_local(), "{mac} is globally administered");
        }
    }

    #[test]
    fn test_random_macs_differ() {
        use std::collections::HashSet;

        let macs: HashSet<_> = (0..1000).map(|_| RandomMac.generate()).collect();
        assert_eq!(macs.len(), 1000);
    }

    #[test]
    fn test_display_and_parse() {
        let mac = MacAddr([0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);

        assert_eq!(mac.to_string(), "02:42:ac:11:00:02");
        assert_eq!("02:42:ac:11:00:02".parse::<MacAddr>().unwrap(), mac);
        assert_eq!("02-42-AC-11-00-02".parse::<MacAddr>().unwrap(), mac);
    }

    #[rstest]
    #[case("")]
    #[case("02:42:ac:11:00")]
    #[case("02:42:ac:11:00:02:03")]
    #[case("02:42:ac:11:00:zz")]
    #[case("2:42:ac:11:00:02")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(matches!(
            input.parse::<MacAddr>(),
            Err(NetError::InvalidMac(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let mac = MacAddr([0x02, 0, 0, 0, 0, 0x01]);

        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"02:00:00:00:00:01\"");
        assert_eq!(serde_json::from_str::<MacAddr>(&json).unwrap(), mac);
    }
}
