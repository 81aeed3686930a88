//! Set difference over merged range lists.

use super::merge::sort_and_merge;
use crate::models::{decrement, increment, AddressRange, AddressRangeVariant};

/// Pieces of `range` left after removing `cut`: the part below `cut` and the
/// part above it. Either side is `None` when `cut` reaches that end of `range`.
///
/// Both ranges must overlap.
fn split_around(
    range: &AddressRange,
    cut: &AddressRange,
) -> (Option<AddressRange>, Option<AddressRange>) {
    debug_assert!(range.overlaps(cut), "{cut} does not overlap {range}");
    // cut.start > range.start implies cut.start is not the zero address, and
    // cut.end < range.end implies cut.end is not the all-ones address.
    let below = (cut.start() > range.start())
        .then(|| AddressRange::new(range.start(), decrement(cut.start())));
    let above =
        (cut.end() < range.end()).then(|| AddressRange::new(increment(cut.end()), range.end()));
    (below, above)
}

/// Compute `base \ union(excluded)`.
///
/// Both inputs are merged first, so callers may pass unsorted lists. The
/// result is a merged range list. Each base range is swept once against the
/// sorted exclusions that overlap it; an exclusion may cut a hole in the
/// middle, trim either end, or remove the range entirely.
///
/// # Examples
/// ```
/// use cidr_merger::{AddressRange, processing::subtract};
/// let base: AddressRange = "1.2.3.0/24".parse().unwrap();
/// let hole: AddressRange = "1.2.3.4".parse().unwrap();
/// let rest: Vec<String> = subtract(&[base], &[hole]).iter().map(|r| r.to_string()).collect();
/// assert_eq!(rest, vec!["1.2.3.0-1.2.3.3", "1.2.3.5-1.2.3.255"]);
/// ```
pub fn subtract(base: &[AddressRange], excluded: &[AddressRange]) -> Vec<AddressRange> {
    let base = sort_and_merge(base);
    let excluded = sort_and_merge(excluded);

    let mut remainder = Vec::with_capacity(base.len());
    for range in &base {
        // Exclusions are sorted and disjoint, so their ends are sorted too.
        let first = excluded.partition_point(|ex| ex.end() < range.start());
        let mut rest = Some(*range);
        for ex in excluded[first..].iter().take_while(|ex| ex.start() <= range.end()) {
            let Some(current) = rest else {
                break;
            };
            if !current.overlaps(ex) {
                continue;
            }
            let (below, above) = split_around(&current, ex);
            remainder.extend(below);
            rest = above;
        }
        remainder.extend(rest);
    }
    sort_and_merge(&remainder)
}

/// [`subtract`] over parsed entries. Every remainder comes back as a
/// [`AddressRangeVariant::Range`], even when it happens to be a whole block.
pub fn subtract_variants(
    base: &[AddressRangeVariant],
    excluded: &[AddressRangeVariant],
) -> Vec<AddressRangeVariant> {
    let base: Vec<AddressRange> = base.iter().map(AddressRangeVariant::to_range).collect();
    let excluded: Vec<AddressRange> = excluded.iter().map(AddressRangeVariant::to_range).collect();
    subtract(&base, &excluded)
        .into_iter()
        .map(AddressRangeVariant::Range)
        .collect()
}
