//! IP address-range algebra.
//!
//! Parses addresses, CIDR blocks and `start-end` ranges of either family,
//! then merges, subtracts, decomposes into minimal CIDR blocks and coarsens
//! them by population thresholds.
//!
//! ```
//! use cidr_merger::{parse, processing::merge_variants};
//! let merged = merge_variants(&[parse("10.0.0.0/25").unwrap(), parse("10.0.0.128/25").unwrap()]);
//! assert_eq!(merged[0].to_string(), "10.0.0.0/24");
//! ```

pub mod cmd;
pub mod config;
pub mod export;
pub mod logging;
pub mod models;
pub mod output;
pub mod parser;
pub mod processing;

pub use models::{Address, AddressFamily, AddressRange, AddressRangeVariant, CidrBlock};
pub use parser::{parse, parse_all, ParseError};
