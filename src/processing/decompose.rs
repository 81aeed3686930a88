//! Range to minimal CIDR block decomposition.

use crate::models::{
    increment, leading_one_bit_position, trailing_zero_bit_count, xor_bytes, AddressRange,
    CidrBlock,
};

/// Split `range` into the fewest CIDR blocks that cover it exactly.
///
/// Blocks come out in address order and never overlap. Each block starts at
/// the cursor and is as large as both the cursor's alignment and the range end
/// allow:
/// - alignment: a block can only start at `cursor` if the bits below its
///   prefix are zero, so `prefix >= bits - trailing_zeros(cursor)`
/// - end: the block must stop before `end + 1`, so the prefix must reach the
///   highest bit where `cursor` and `end + 1` differ. When `end` is the last
///   address of the family there is no such limit.
///
/// # Examples
/// ```
/// use cidr_merger::{AddressRange, processing::to_cidr_blocks};
/// let range: AddressRange = "10.0.0.0-10.0.2.255".parse().unwrap();
/// let blocks: Vec<String> = to_cidr_blocks(&range).iter().map(|b| b.to_string()).collect();
/// assert_eq!(blocks, vec!["10.0.0.0/23", "10.0.2.0/24"]);
/// ```
pub fn to_cidr_blocks(range: &AddressRange) -> Vec<CidrBlock> {
    let bits = range.family().bits();
    let end = range.end();
    let past_end = (!end.is_all_ones()).then(|| increment(end));

    let mut blocks = Vec::new();
    let mut cursor = range.start();
    loop {
        let aligned = bits - trailing_zero_bit_count(cursor);
        let needed = past_end
            .map(|limit| leading_one_bit_position(xor_bytes(limit, cursor)))
            .unwrap_or(0);
        let block = CidrBlock::containing(cursor, aligned.max(needed));
        blocks.push(block);

        let last = block.last();
        if last >= end {
            break;
        }
        cursor = increment(last);
    }
    blocks
}
