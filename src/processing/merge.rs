//! Sorting and coalescing of address ranges.

use crate::models::{increment, AddressRange, AddressRangeVariant, CidrBlock};

/// Sort `ranges` and coalesce overlapping or adjacent entries.
///
/// The result is a merged range list: ascending by start, with a gap of at
/// least one address between consecutive entries of the same family. IPv4
/// entries come before IPv6 entries and the two are never combined.
///
/// # Examples
/// ```
/// use cidr_merger::{AddressRange, processing::sort_and_merge};
/// let ranges: Vec<AddressRange> = ["1.2.4.0/24", "1.2.3.0/24"]
///     .iter()
///     .map(|s| s.parse().unwrap())
///     .collect();
/// let merged = sort_and_merge(&ranges);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].to_string(), "1.2.3.0-1.2.4.255");
/// ```
pub fn sort_and_merge(ranges: &[AddressRange]) -> Vec<AddressRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort_unstable_by_key(|r| r.start());

    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::with_capacity(ranges.len());
    let (mut start, mut end) = (first.start(), first.end());
    for item in iter {
        if item.family() != start.family() {
            merged.push(AddressRange::new(start, end));
            (start, end) = (item.start(), item.end());
            continue;
        }
        // The last address of a family swallows everything after it.
        if end.is_all_ones() || item.start() <= increment(end) {
            if item.end() > end {
                end = item.end();
            }
        } else {
            merged.push(AddressRange::new(start, end));
            (start, end) = (item.start(), item.end());
        }
    }
    merged.push(AddressRange::new(start, end));
    merged
}

/// Merge CIDR blocks and re-decompose them into a minimal, ordered block list.
pub fn merge_cidr_blocks(blocks: &[CidrBlock]) -> Vec<CidrBlock> {
    let ranges: Vec<AddressRange> = blocks.iter().map(CidrBlock::to_range).collect();
    sort_and_merge(&ranges)
        .iter()
        .flat_map(AddressRange::to_cidr_blocks)
        .collect()
}

/// Merge parsed entries of any shape, returning each merged range in its
/// simplest shape.
pub fn merge_variants(variants: &[AddressRangeVariant]) -> Vec<AddressRangeVariant> {
    let ranges: Vec<AddressRange> = variants.iter().map(AddressRangeVariant::to_range).collect();
    sort_and_merge(&ranges)
        .into_iter()
        .map(AddressRangeVariant::canonical)
        .collect()
}
