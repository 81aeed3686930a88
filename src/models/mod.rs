//! Value types of the address-range algebra.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Address`] and [`AddressFamily`] - IPv4/IPv6 addresses as fixed-length bytes
//! - [`CidrBlock`] - network address plus prefix length
//! - [`AddressRange`] - inclusive `[start, end]` range
//! - [`AddressRangeVariant`] - host, network or explicit range as written
//! - [`bits`] - byte-wise increment/decrement, masks and bit counts

mod address;
pub mod bits;
mod cidr;
mod range;
mod variant;

// Re-export public types
pub use address::{Address, AddressFamily};
pub use bits::{
    broadcast_address, decrement, increment, leading_one_bit_position, network_address,
    trailing_zero_bit_count, xor_bytes,
};
pub use cidr::CidrBlock;
pub use range::AddressRange;
pub use variant::AddressRangeVariant;
