//! IP address value type shared by every range operation.
//!
//! An [`Address`] is a fixed-length byte string (4 bytes for IPv4, 16 for IPv6)
//! compared byte-by-byte inside its family. All IPv4 addresses sort before all
//! IPv6 addresses, so sorting a mixed list keeps each family contiguous.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::parser::ParseError;

/// Address family: IPv4 (4-byte) or IPv6 (16-byte) address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Number of bytes in an address of this family.
    pub const fn byte_len(self) -> usize {
        match self {
            AddressFamily::V4 => 4,
            AddressFamily::V6 => 16,
        }
    }

    /// Number of bits in an address of this family, i.e. the longest prefix length.
    pub const fn bits(self) -> u8 {
        match self {
            AddressFamily::V4 => 32,
            AddressFamily::V6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// A single IPv4 or IPv6 address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    family: AddressFamily,
    // IPv4 uses the first 4 bytes, the rest stay zero.
    octets: [u8; 16],
}

impl Address {
    /// Build an address from its raw big-endian bytes.
    ///
    /// Panics if `bytes` does not have the length of `family`.
    pub fn from_bytes(family: AddressFamily, bytes: &[u8]) -> Address {
        assert_eq!(
            bytes.len(),
            family.byte_len(),
            "{family} address needs {} bytes, got {}",
            family.byte_len(),
            bytes.len()
        );
        let mut octets = [0u8; 16];
        octets[..bytes.len()].copy_from_slice(bytes);
        Address { family, octets }
    }

    /// The all-zero address of `family` (`0.0.0.0` or `::`).
    pub fn zero(family: AddressFamily) -> Address {
        Address {
            family,
            octets: [0u8; 16],
        }
    }

    /// The all-ones address of `family` (`255.255.255.255` or `ffff:...:ffff`).
    pub fn all_ones(family: AddressFamily) -> Address {
        let mut octets = [0u8; 16];
        octets[..family.byte_len()].fill(0xFF);
        Address { family, octets }
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// The significant bytes of the address, most significant first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.octets[..self.family.byte_len()]
    }

    pub fn is_zero(&self) -> bool {
        self.as_bytes().iter().all(|b| *b == 0)
    }

    /// True for the last address of the family, which can never be incremented.
    pub fn is_all_ones(&self) -> bool {
        self.as_bytes().iter().all(|b| *b == 0xFF)
    }

    pub fn to_ip_addr(&self) -> IpAddr {
        match self.family {
            AddressFamily::V4 => IpAddr::V4(Ipv4Addr::new(
                self.octets[0],
                self.octets[1],
                self.octets[2],
                self.octets[3],
            )),
            AddressFamily::V6 => IpAddr::V6(Ipv6Addr::from(self.octets)),
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(addr: Ipv4Addr) -> Address {
        Address::from_bytes(AddressFamily::V4, &addr.octets())
    }
}

impl From<Ipv6Addr> for Address {
    fn from(addr: Ipv6Addr) -> Address {
        Address::from_bytes(AddressFamily::V6, &addr.octets())
    }
}

impl From<IpAddr> for Address {
    fn from(addr: IpAddr) -> Address {
        match addr {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl From<Address> for IpAddr {
    fn from(addr: Address) -> IpAddr {
        addr.to_ip_addr()
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Address, ParseError> {
        s.parse::<IpAddr>()
            .map(Address::from)
            .map_err(|_| ParseError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // IPv4-mapped IPv6 addresses print as ::ffff:a.b.c.d
        write!(f, "{}", self.to_ip_addr())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
