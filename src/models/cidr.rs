//! CIDR block: a network address plus prefix length.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::bits::{broadcast_address, network_address};
use super::{Address, AddressFamily, AddressRange};
use crate::parser::ParseError;

/// An aligned, power-of-two sized block of addresses.
///
/// Bits of `network` beyond `prefix_len` are always zero. Blocks order by
/// network address first, then by prefix length.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CidrBlock {
    network: Address,
    prefix_len: u8,
}

impl CidrBlock {
    /// Create a block, rejecting prefix lengths beyond the family width and
    /// networks with host bits set.
    pub fn new(network: Address, prefix_len: u8) -> Result<CidrBlock, ParseError> {
        let invalid = || ParseError::InvalidCidr(format!("{network}/{prefix_len}"));
        if prefix_len > network.family().bits() {
            return Err(invalid());
        }
        if network_address(network, prefix_len) != network {
            return Err(invalid());
        }
        Ok(CidrBlock {
            network,
            prefix_len,
        })
    }

    /// The block of length `prefix_len` that contains `addr`.
    ///
    /// Panics if `prefix_len` exceeds the family width.
    pub fn containing(addr: Address, prefix_len: u8) -> CidrBlock {
        CidrBlock {
            network: network_address(addr, prefix_len),
            prefix_len,
        }
    }

    /// Single-address block (`/32` or `/128`).
    pub fn host(addr: Address) -> CidrBlock {
        CidrBlock {
            network: addr,
            prefix_len: addr.family().bits(),
        }
    }

    pub fn network(&self) -> Address {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn family(&self) -> AddressFamily {
        self.network.family()
    }

    /// Lowest address in the block.
    pub fn first(&self) -> Address {
        self.network
    }

    /// Highest (broadcast) address in the block.
    pub fn last(&self) -> Address {
        broadcast_address(self.network, self.prefix_len)
    }

    pub fn is_host(&self) -> bool {
        self.prefix_len == self.family().bits()
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.family() == self.family() && self.first() <= addr && addr <= self.last()
    }

    /// True if every address of `other` lies inside `self`.
    pub fn contains_block(&self, other: &CidrBlock) -> bool {
        other.family() == self.family()
            && other.prefix_len >= self.prefix_len
            && network_address(other.network, self.prefix_len) == self.network
    }

    pub fn overlaps(&self, other: &CidrBlock) -> bool {
        self.contains_block(other) || other.contains_block(self)
    }

    pub fn to_range(&self) -> AddressRange {
        AddressRange::new(self.first(), self.last())
    }
}

impl From<CidrBlock> for AddressRange {
    fn from(block: CidrBlock) -> AddressRange {
        block.to_range()
    }
}

impl FromStr for CidrBlock {
    type Err = ParseError;

    /// Parse `address/prefix_len`. Host bits are cleared, so `10.1.2.3/16`
    /// yields `10.1.0.0/16`.
    fn from_str(s: &str) -> Result<CidrBlock, ParseError> {
        let invalid = || ParseError::InvalidCidr(s.to_string());
        let (addr, len) = s.split_once('/').ok_or_else(invalid)?;
        let addr: Address = addr.parse().map_err(|_| invalid())?;
        if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let prefix_len: u8 = len.parse().map_err(|_| invalid())?;
        if prefix_len > addr.family().bits() {
            return Err(invalid());
        }
        Ok(CidrBlock::containing(addr, prefix_len))
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl fmt::Debug for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CidrBlock({self})")
    }
}

impl Serialize for CidrBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D>(deserializer: D) -> Result<CidrBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    fn cidr(s: &str) -> CidrBlock {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_cidr() {
        let block = cidr("10.0.0.0/24");
        assert_eq!(block.network(), addr("10.0.0.0"));
        assert_eq!(block.prefix_len(), 24);
        assert_eq!(block.to_string(), "10.0.0.0/24");
        assert_eq!(cidr("10.1.2.3/16").to_string(), "10.1.0.0/16");
        assert_eq!(cidr("2001:db8::1/32").to_string(), "2001:db8::/32");
        assert_eq!(cidr("0.0.0.0/0").last(), addr("255.255.255.255"));
    }

    #[test]
    fn test_parse_cidr_errors() {
        for bad in [
            "10.0.0.0",
            "10.0.0.0/",
            "10.0.0.0/33",
            "::/129",
            "10.0.0/8",
            "10.0.0.0/+8",
            "10.0.0.0/8/8",
            "10.0.0.0/a",
        ] {
            assert_eq!(
                bad.parse::<CidrBlock>().unwrap_err(),
                ParseError::InvalidCidr(bad.to_string()),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_new_checks_host_bits() {
        assert!(CidrBlock::new(addr("10.0.0.0"), 8).is_ok());
        assert!(CidrBlock::new(addr("10.0.0.1"), 8).is_err());
        assert!(CidrBlock::new(addr("10.0.0.0"), 33).is_err());
        assert_eq!(
            CidrBlock::new(addr("10.0.0.0"), 33).unwrap_err().to_string(),
            "invalid CIDR network: \"10.0.0.0/33\""
        );
    }

    #[test]
    fn test_first_last() {
        let block = cidr("192.168.0.0/16");
        assert_eq!(block.first(), addr("192.168.0.0"));
        assert_eq!(block.last(), addr("192.168.255.255"));
        let host = CidrBlock::host(addr("1.2.3.4"));
        assert!(host.is_host());
        assert_eq!(host.first(), host.last());
        assert_eq!(host.to_string(), "1.2.3.4/32");
    }

    #[test]
    fn test_contains_and_overlaps() {
        let block = cidr("10.0.0.0/8");
        assert!(block.contains(addr("10.255.0.1")));
        assert!(!block.contains(addr("11.0.0.0")));
        assert!(!block.contains(addr("::a00:1")));
        assert!(block.contains_block(&cidr("10.1.0.0/16")));
        assert!(!cidr("10.1.0.0/16").contains_block(&block));
        assert!(block.overlaps(&cidr("10.1.0.0/16")));
        assert!(cidr("8.0.0.0/6").overlaps(&block));
        assert!(!cidr("172.16.0.0/12").overlaps(&block));
    }

    #[test]
    fn test_to_range() {
        let range = cidr("1.2.3.0/24").to_range();
        assert_eq!(range.start(), addr("1.2.3.0"));
        assert_eq!(range.end(), addr("1.2.3.255"));
    }

    #[test]
    fn test_ordering() {
        let mut blocks = vec![cidr("10.0.1.0/24"), cidr("10.0.0.0/24"), cidr("10.0.0.0/8")];
        blocks.sort();
        assert_eq!(
            blocks,
            vec![cidr("10.0.0.0/8"), cidr("10.0.0.0/24"), cidr("10.0.1.0/24")]
        );
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&vec![cidr("10.0.0.0/8")]).unwrap();
        assert_eq!(json, r#"["10.0.0.0/8"]"#);
        let back: Vec<CidrBlock> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![cidr("10.0.0.0/8")]);
    }
}
