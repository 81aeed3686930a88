//! Inclusive address range `[start, end]`.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Address, AddressFamily, CidrBlock};
use crate::parser::{parse, ParseError};
use crate::processing::to_cidr_blocks;

/// Inclusive set of addresses from `start` to `end`, both of one family.
///
/// Ranges order by start address, then by end address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressRange {
    start: Address,
    end: Address,
}

impl AddressRange {
    /// Create a range.
    ///
    /// Panics if the bounds belong to different families or `start > end`;
    /// both indicate a caller bug upstream of the range algebra.
    pub fn new(start: Address, end: Address) -> AddressRange {
        assert_eq!(
            start.family(),
            end.family(),
            "range bounds of mismatched families: {start}-{end}"
        );
        assert!(start <= end, "range start {start} > end {end}");
        AddressRange { start, end }
    }

    /// Create a range from untrusted bounds, returning `None` instead of panicking.
    pub fn try_new(start: Address, end: Address) -> Option<AddressRange> {
        (start.family() == end.family() && start <= end).then_some(AddressRange { start, end })
    }

    /// Range holding exactly one address.
    pub fn single(addr: Address) -> AddressRange {
        AddressRange {
            start: addr,
            end: addr,
        }
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    pub fn family(&self) -> AddressFamily {
        self.start.family()
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.family() == self.family() && self.start <= addr && addr <= self.end
    }

    /// True if every address of `other` lies inside `self`.
    pub fn contains_range(&self, other: &AddressRange) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    /// True if the two ranges share at least one address.
    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.family() == other.family() && self.start <= other.end && other.start <= self.end
    }

    /// Minimal ordered list of CIDR blocks covering exactly this range.
    pub fn to_cidr_blocks(&self) -> Vec<CidrBlock> {
        to_cidr_blocks(self)
    }
}

impl FromStr for AddressRange {
    type Err = ParseError;

    /// Accepts any of the three textual forms.
    fn from_str(s: &str) -> Result<AddressRange, ParseError> {
        parse(s).map(|variant| variant.to_range())
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl fmt::Debug for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AddressRange({self})")
    }
}

impl Serialize for AddressRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddressRange {
    fn deserialize<D>(deserializer: D) -> Result<AddressRange, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
