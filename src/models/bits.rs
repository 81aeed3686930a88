//! Byte-wise bit arithmetic on [`Address`] values.
//!
//! Every function works on the raw big-endian bytes, carrying bit positions
//! across byte boundaries, so the same code serves IPv4 and IPv6.

use super::{Address, AddressFamily};

/// Mask byte at `index` for a prefix of `prefix_len` bits.
fn mask_byte(index: usize, prefix_len: u8) -> u8 {
    let covered = (prefix_len as usize).saturating_sub(index * 8).min(8);
    if covered == 0 {
        0
    } else {
        0xFFu8 << (8 - covered)
    }
}

fn check_prefix_len(family: AddressFamily, prefix_len: u8) {
    assert!(
        prefix_len <= family.bits(),
        "prefix length /{prefix_len} exceeds the {}-bit {family} address width",
        family.bits()
    );
}

/// Apply `f(index, byte)` to every byte of `addr`.
fn map_bytes(addr: Address, f: impl Fn(usize, u8) -> u8) -> Address {
    let family = addr.family();
    let mut bytes = [0u8; 16];
    for (i, b) in addr.as_bytes().iter().enumerate() {
        bytes[i] = f(i, *b);
    }
    Address::from_bytes(family, &bytes[..family.byte_len()])
}

/// Clear every bit beyond `prefix_len`, giving the network address of the block.
pub fn network_address(addr: Address, prefix_len: u8) -> Address {
    check_prefix_len(addr.family(), prefix_len);
    map_bytes(addr, |i, b| b & mask_byte(i, prefix_len))
}

/// Highest address of the block `network/prefix_len`.
///
/// Each byte is OR-ed with the inverted mask byte, so host bits of `network`
/// need not be zero.
///
/// # Examples
/// ```
/// use cidr_merger::models::{broadcast_address, Address};
/// let net: Address = "192.168.1.0".parse().unwrap();
/// assert_eq!(broadcast_address(net, 23).to_string(), "192.168.1.255");
/// assert_eq!(broadcast_address(net, 16).to_string(), "192.168.255.255");
/// ```
pub fn broadcast_address(network: Address, prefix_len: u8) -> Address {
    check_prefix_len(network.family(), prefix_len);
    map_bytes(network, |i, b| b | !mask_byte(i, prefix_len))
}

/// Add one, carrying right to left.
///
/// Panics on the all-ones address; callers check [`Address::is_all_ones`] first.
pub fn increment(addr: Address) -> Address {
    assert!(
        !addr.is_all_ones(),
        "cannot increment {addr}, the last {} address",
        addr.family()
    );
    let family = addr.family();
    let mut bytes = [0u8; 16];
    bytes[..family.byte_len()].copy_from_slice(addr.as_bytes());
    for b in bytes[..family.byte_len()].iter_mut().rev() {
        if *b == 0xFF {
            *b = 0;
        } else {
            *b += 1;
            break;
        }
    }
    Address::from_bytes(family, &bytes[..family.byte_len()])
}

/// Subtract one, borrowing right to left.
///
/// Panics on the all-zero address; callers check [`Address::is_zero`] first.
pub fn decrement(addr: Address) -> Address {
    assert!(
        !addr.is_zero(),
        "cannot decrement {addr}, the first {} address",
        addr.family()
    );
    let family = addr.family();
    let mut bytes = [0u8; 16];
    bytes[..family.byte_len()].copy_from_slice(addr.as_bytes());
    for b in bytes[..family.byte_len()].iter_mut().rev() {
        if *b == 0 {
            *b = 0xFF;
        } else {
            *b -= 1;
            break;
        }
    }
    Address::from_bytes(family, &bytes[..family.byte_len()])
}

/// Bitwise `a ^ b`. Both operands must belong to the same family.
pub fn xor_bytes(a: Address, b: Address) -> Address {
    assert_eq!(
        a.family(),
        b.family(),
        "xor of mismatched families: {a} ^ {b}"
    );
    let other = b.as_bytes();
    map_bytes(a, |i, byte| byte ^ other[i])
}

/// 1-based position of the most significant set bit, counted from the left.
///
/// Returns 0 for the all-zero address. For `xor(a, b)` this is the length of
/// the shortest prefix that separates `a` from `b`.
pub fn leading_one_bit_position(addr: Address) -> u8 {
    addr.as_bytes()
        .iter()
        .enumerate()
        .find(|(_, b)| **b != 0)
        .map(|(i, b)| (i * 8) as u8 + b.leading_zeros() as u8 + 1)
        .unwrap_or(0)
}

/// Number of zero bits at the right end of the address.
///
/// The all-zero address yields the full family width.
pub fn trailing_zero_bit_count(addr: Address) -> u8 {
    let bytes = addr.as_bytes();
    bytes
        .iter()
        .rev()
        .enumerate()
        .find(|(_, b)| **b != 0)
        .map(|(i, b)| (i * 8) as u8 + b.trailing_zeros() as u8)
        .unwrap_or(addr.family().bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_mask_byte() {
        assert_eq!(mask_byte(0, 0), 0x00);
        assert_eq!(mask_byte(0, 3), 0xE0);
        assert_eq!(mask_byte(0, 8), 0xFF);
        assert_eq!(mask_byte(0, 24), 0xFF);
        assert_eq!(mask_byte(2, 20), 0xF0);
        assert_eq!(mask_byte(3, 24), 0x00);
        assert_eq!(mask_byte(15, 128), 0xFF);
    }

    #[test]
    fn test_network_address() {
        let ip = addr("192.168.1.42");
        assert_eq!(network_address(ip, 24), addr("192.168.1.0"));
        assert_eq!(network_address(ip, 16), addr("192.168.0.0"));
        assert_eq!(network_address(ip, 8), addr("192.0.0.0"));
        assert_eq!(network_address(ip, 32), ip);
        assert_eq!(network_address(ip, 0), addr("0.0.0.0"));
        assert_eq!(
            network_address(addr("2001:db8:abcd:1234::1"), 48),
            addr("2001:db8:abcd::")
        );
    }

    #[test]
    #[should_panic(expected = "exceeds the 32-bit IPv4 address width")]
    fn test_network_address_prefix_too_long() {
        network_address(addr("10.0.0.0"), 33);
    }

    #[test]
    fn test_broadcast_address() {
        let ip = addr("192.168.1.0");
        assert_eq!(broadcast_address(ip, 24), addr("192.168.1.255"));
        assert_eq!(broadcast_address(ip, 16), addr("192.168.255.255"));
        assert_eq!(broadcast_address(ip, 8), addr("192.255.255.255"));
        assert_eq!(broadcast_address(ip, 32), ip);
        assert_eq!(broadcast_address(ip, 0), addr("255.255.255.255"));
        assert_eq!(broadcast_address(ip, 20), addr("192.168.15.255"));
        assert_eq!(
            broadcast_address(addr("2001:db8::"), 32),
            addr("2001:db8:ffff:ffff:ffff:ffff:ffff:ffff")
        );
    }

    #[test]
    fn test_increment() {
        assert_eq!(increment(addr("1.2.1.2")), addr("1.2.1.3"));
        assert_eq!(increment(addr("1.2.1.255")), addr("1.2.2.0"));
        assert_eq!(increment(addr("1.2.255.255")), addr("1.3.0.0"));
        assert_eq!(increment(addr("::ffff")), addr("::1:0"));
    }

    #[test]
    #[should_panic(expected = "cannot increment")]
    fn test_increment_all_ones() {
        increment(addr("255.255.255.255"));
    }

    #[test]
    fn test_decrement() {
        assert_eq!(decrement(addr("1.2.1.2")), addr("1.2.1.1"));
        assert_eq!(decrement(addr("1.2.1.0")), addr("1.2.0.255"));
        assert_eq!(decrement(addr("1.2.0.0")), addr("1.1.255.255"));
        assert_eq!(decrement(addr("::1:0")), addr("::ffff"));
    }

    #[test]
    #[should_panic(expected = "cannot decrement")]
    fn test_decrement_zero() {
        decrement(addr("::"));
    }

    #[test]
    fn test_xor_bytes() {
        assert_eq!(
            xor_bytes(addr("255.0.0.1"), addr("255.0.0.0")),
            addr("0.0.0.1")
        );
        assert_eq!(
            xor_bytes(addr("10.0.0.0"), addr("10.0.0.0")),
            addr("0.0.0.0")
        );
    }

    #[test]
    #[should_panic(expected = "mismatched families")]
    fn test_xor_bytes_mixed_families() {
        xor_bytes(addr("10.0.0.0"), addr("::1"));
    }

    #[test]
    fn test_leading_one_bit_position() {
        assert_eq!(leading_one_bit_position(addr("0.0.0.0")), 0);
        assert_eq!(leading_one_bit_position(addr("128.0.0.0")), 1);
        assert_eq!(leading_one_bit_position(addr("0.0.1.0")), 24);
        assert_eq!(leading_one_bit_position(addr("0.0.0.1")), 32);
        assert_eq!(leading_one_bit_position(addr("::1")), 128);
    }

    #[test]
    fn test_trailing_zero_bit_count() {
        assert_eq!(trailing_zero_bit_count(addr("192.168.1.1")), 0);
        assert_eq!(trailing_zero_bit_count(addr("10.6.2.80")), 4);
        assert_eq!(trailing_zero_bit_count(addr("10.11.12.0")), 10);
        assert_eq!(trailing_zero_bit_count(addr("128.0.0.0")), 31);
        assert_eq!(trailing_zero_bit_count(addr("0.0.0.0")), 32);
        assert_eq!(trailing_zero_bit_count(addr("::")), 128);
        assert_eq!(trailing_zero_bit_count(addr("2001:db8::")), 99);
    }
}
