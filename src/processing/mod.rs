//! Range algebra over address values.
//!
//! This module contains the algorithms built on the model types:
//! - [`decompose`] - range to minimal CIDR blocks
//! - [`merge`] - sort and coalesce ranges per family
//! - [`subtract`] - set difference of merged range lists
//! - [`aggregate`] - threshold-based coarsening into wider blocks

mod aggregate;
mod decompose;
mod merge;
mod subtract;

// Re-export public functions
pub use aggregate::{
    coarsen, parse_steps, AggregationMode, AggregationPolicy, AggregationStep, PolicyError,
};
pub use decompose::to_cidr_blocks;
pub use merge::{merge_cidr_blocks, merge_variants, sort_and_merge};
pub use subtract::{subtract, subtract_variants};
