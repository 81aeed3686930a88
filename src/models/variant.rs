//! The three textual shapes of an address set.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Address, AddressFamily, AddressRange, CidrBlock};
use crate::parser::{parse, ParseError};

/// A parsed address set in the shape it was written in.
///
/// | text                        | variant      |
/// |-----------------------------|--------------|
/// | `127.0.0.1`                 | `SingleHost` |
/// | `192.168.8.0/22`            | `Network`    |
/// | `128.0.0.0-255.255.255.255` | `Range`      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressRangeVariant {
    SingleHost(Address),
    Network(CidrBlock),
    Range(AddressRange),
}

impl AddressRangeVariant {
    pub fn family(&self) -> AddressFamily {
        match self {
            AddressRangeVariant::SingleHost(addr) => addr.family(),
            AddressRangeVariant::Network(block) => block.family(),
            AddressRangeVariant::Range(range) => range.family(),
        }
    }

    pub fn to_range(&self) -> AddressRange {
        match self {
            AddressRangeVariant::SingleHost(addr) => AddressRange::single(*addr),
            AddressRangeVariant::Network(block) => block.to_range(),
            AddressRangeVariant::Range(range) => *range,
        }
    }

    pub fn to_cidr_blocks(&self) -> Vec<CidrBlock> {
        match self {
            AddressRangeVariant::SingleHost(addr) => vec![CidrBlock::host(*addr)],
            AddressRangeVariant::Network(block) => vec![*block],
            AddressRangeVariant::Range(range) => range.to_cidr_blocks(),
        }
    }

    /// Simplest shape that represents `range`: a host, a single block, or
    /// an explicit range.
    pub fn canonical(range: AddressRange) -> AddressRangeVariant {
        if range.is_single() {
            return AddressRangeVariant::SingleHost(range.start());
        }
        match range.to_cidr_blocks().as_slice() {
            [block] => AddressRangeVariant::Network(*block),
            _ => AddressRangeVariant::Range(range),
        }
    }
}

impl From<Address> for AddressRangeVariant {
    fn from(addr: Address) -> AddressRangeVariant {
        AddressRangeVariant::SingleHost(addr)
    }
}

impl From<CidrBlock> for AddressRangeVariant {
    fn from(block: CidrBlock) -> AddressRangeVariant {
        AddressRangeVariant::Network(block)
    }
}

impl From<AddressRange> for AddressRangeVariant {
    fn from(range: AddressRange) -> AddressRangeVariant {
        AddressRangeVariant::Range(range)
    }
}

impl FromStr for AddressRangeVariant {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<AddressRangeVariant, ParseError> {
        parse(s)
    }
}

impl fmt::Display for AddressRangeVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddressRangeVariant::SingleHost(addr) => write!(f, "{addr}"),
            AddressRangeVariant::Network(block) => write!(f, "{block}"),
            AddressRangeVariant::Range(range) => write!(f, "{range}"),
        }
    }
}

impl Serialize for AddressRangeVariant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddressRangeVariant {
    fn deserialize<D>(deserializer: D) -> Result<AddressRangeVariant, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(s: &str) -> AddressRangeVariant {
        s.parse().unwrap()
    }

    #[test]
    fn test_to_range() {
        assert_eq!(variant("1.2.3.4").to_range().to_string(), "1.2.3.4-1.2.3.4");
        assert_eq!(
            variant("1.2.3.0/24").to_range().to_string(),
            "1.2.3.0-1.2.3.255"
        );
        assert_eq!(
            variant("1.2.3.0-1.2.3.9").to_range().to_string(),
            "1.2.3.0-1.2.3.9"
        );
    }

    #[test]
    fn test_to_cidr_blocks() {
        assert_eq!(
            variant("1.2.3.4").to_cidr_blocks(),
            vec!["1.2.3.4/32".parse::<CidrBlock>().unwrap()]
        );
        assert_eq!(
            variant("2001:db8::/48").to_cidr_blocks(),
            vec!["2001:db8::/48".parse::<CidrBlock>().unwrap()]
        );
        assert_eq!(variant("1.2.3.0-1.2.3.9").to_cidr_blocks().len(), 2);
    }

    #[test]
    fn test_canonical() {
        let canon = |s: &str| AddressRangeVariant::canonical(s.parse().unwrap()).to_string();
        assert_eq!(canon("1.2.3.4-1.2.3.4"), "1.2.3.4");
        assert_eq!(canon("1.2.3.0-1.2.3.255"), "1.2.3.0/24");
        assert_eq!(canon("1.2.3.0-1.2.4.255"), "1.2.3.0-1.2.4.255");
        assert_eq!(canon("::-ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"), "::/0");
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["10.0.0.1", "10.0.0.0/8", "10.0.0.1-10.0.0.9", "fe80::/10", "::1-::5"] {
            assert_eq!(variant(text).to_string(), text);
        }
    }

    #[test]
    fn test_family() {
        assert_eq!(variant("10.0.0.1").family(), AddressFamily::V4);
        assert_eq!(variant("::1-::5").family(), AddressFamily::V6);
    }
}
