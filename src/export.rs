//! Network-block export of observed client addresses.
//!
//! Turns a history of addresses (as text) into a short list of CIDR blocks,
//! e.g. for a VPN allow-list: parse, drop private addresses, coarsen, merge,
//! then cut out explicit exclusions.

use lazy_static::lazy_static;

use crate::models::{AddressRange, AddressRangeVariant, CidrBlock};
use crate::output::join;
use crate::parser::parse_all;
use crate::processing::{coarsen, sort_and_merge, subtract, AggregationPolicy};

lazy_static! {
    /// RFC 1918 private IPv4 networks.
    pub static ref PRIVATE_NETWORKS: Vec<CidrBlock> =
        ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"]
            .iter()
            .map(|s| s.parse().expect("Invalid private network?"))
            .collect();
}

/// True if `block` starts inside one of the private networks.
pub fn is_private(block: &CidrBlock) -> bool {
    PRIVATE_NETWORKS
        .iter()
        .any(|private| private.contains(block.network()))
}

/// What an export run does after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Coarsening policy.
    pub policy: AggregationPolicy,
    /// Leave private networks out of the input and the output.
    pub exclude_private: bool,
    /// Ranges removed from the final result.
    pub exclude: Vec<AddressRangeVariant>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            policy: AggregationPolicy::cascading_default(),
            exclude_private: true,
            exclude: Vec::new(),
        }
    }
}

/// Run the export pipeline over raw history entries.
///
/// Returns minimal, sorted, non-overlapping CIDR blocks. Entries that do not
/// parse are skipped.
pub fn export<I, S>(entries: I, options: &ExportOptions) -> Vec<CidrBlock>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut blocks: Vec<CidrBlock> = parse_all(entries)
        .iter()
        .flat_map(AddressRangeVariant::to_cidr_blocks)
        .collect();
    let parsed = blocks.len();

    let mut excluded: Vec<AddressRange> = options
        .exclude
        .iter()
        .map(AddressRangeVariant::to_range)
        .collect();

    let policy = if options.exclude_private {
        blocks.retain(|block| !is_private(block));
        log::debug!("Dropped {} private entries", parsed - blocks.len());
        excluded.extend(PRIVATE_NETWORKS.iter().map(CidrBlock::to_range));
        options
            .policy
            .clone()
            .with_reserved(PRIVATE_NETWORKS.iter().copied())
    } else {
        options.policy.clone()
    };

    let coarse: Vec<AddressRange> = coarsen(&blocks, &policy)
        .iter()
        .map(CidrBlock::to_range)
        .collect();
    let merged = sort_and_merge(&coarse);
    let result: Vec<CidrBlock> = subtract(&merged, &excluded)
        .iter()
        .flat_map(AddressRange::to_cidr_blocks)
        .collect();

    log::info!(
        "Exported {} blocks from {parsed} entries ({} mode)",
        result.len(),
        policy.mode()
    );
    result
}

/// Text form of an export result, e.g. `1.2.0.0/16,8.8.8.0/24`.
pub fn render(blocks: &[CidrBlock], separator: &str) -> String {
    join(blocks, separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{AggregationMode, AggregationStep};

    fn texts(blocks: &[CidrBlock]) -> Vec<String> {
        blocks.iter().map(|b| b.to_string()).collect()
    }

    fn options(mode: AggregationMode, steps: &[(u8, usize)]) -> ExportOptions {
        let steps = steps
            .iter()
            .map(|(prefix_len, min_count)| AggregationStep::new(*prefix_len, *min_count))
            .collect();
        ExportOptions {
            policy: AggregationPolicy::new(mode, steps).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn test_private_networks() {
        assert_eq!(PRIVATE_NETWORKS.len(), 3);
        assert!(is_private(&"10.1.2.3/32".parse().unwrap()));
        assert!(is_private(&"172.31.0.0/16".parse().unwrap()));
        assert!(!is_private(&"172.32.0.0/16".parse().unwrap()));
        assert!(!is_private(&"8.8.8.8/32".parse().unwrap()));
    }

    #[test]
    fn test_export_default_cascading() {
        let history = ["1.2.3.4", "1.2.3.9", "1.2.4.1", "1.2.5.1", "8.8.8.8", "10.0.0.1"];
        let blocks = export(history, &ExportOptions::default());
        // three /24s under 1.2.0.0/16 reach the /16 threshold of 3
        assert_eq!(texts(&blocks), vec!["1.2.0.0/16", "8.8.8.0/24"]);
        assert_eq!(render(&blocks, ","), "1.2.0.0/16,8.8.8.0/24");
    }

    #[test]
    fn test_export_skips_garbage() {
        let blocks = export(
            ["1.1.1.1", "not-an-ip", "2.2.2.2,300.1.1.1"],
            &options(AggregationMode::Independent, &[(30, 2)]),
        );
        assert_eq!(texts(&blocks), vec!["1.1.1.1/32", "2.2.2.2/32"]);
    }

    #[test]
    fn test_export_keeps_private_when_asked() {
        let mut opts = options(AggregationMode::Independent, &[(24, 2)]);
        opts.exclude_private = false;
        let blocks = export(["10.0.0.1", "10.0.0.2"], &opts);
        assert_eq!(texts(&blocks), vec!["10.0.0.0/24"]);

        opts.exclude_private = true;
        assert!(export(["10.0.0.1", "10.0.0.2"], &opts).is_empty());
    }

    #[test]
    fn test_export_never_covers_private_networks() {
        let history: Vec<String> = (0..20).map(|i| format!("11.0.{i}.1")).collect();
        let blocks = export(&history, &options(AggregationMode::Independent, &[(6, 10)]));
        // 8.0.0.0/6 would swallow 10.0.0.0/8
        assert_eq!(texts(&blocks), vec!["11.0.0.0/8"]);
    }

    #[test]
    fn test_export_subtracts_exclusions() {
        let mut opts = options(AggregationMode::Independent, &[(24, 2)]);
        opts.exclude = vec!["1.2.3.0/25".parse().unwrap()];
        let blocks = export(["1.2.3.1", "1.2.3.200"], &opts);
        assert_eq!(texts(&blocks), vec!["1.2.3.128/25"]);
    }

    #[test]
    fn test_export_mixed_families() {
        let blocks = export(
            ["2001:db8::1", "2001:db8::2", "9.9.9.9"],
            &options(AggregationMode::Independent, &[(24, 1)]),
        );
        assert_eq!(texts(&blocks), vec!["9.9.9.0/24", "2001:db8::1/128", "2001:db8::2/128"]);
    }
}
