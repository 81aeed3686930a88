//! Text parsing for the three address-set forms.
//!
//! ```text
//! 128.0.0.0-255.255.255.255 -> Range
//! 192.168.8.0/22            -> Network
//! 127.0.0.1                 -> SingleHost
//! ```

use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::models::{Address, AddressRange, AddressRangeVariant, CidrBlock};

/// Why a piece of text is not an address, network or range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid CIDR network: {0:?}")]
    InvalidCidr(String),
    #[error("invalid address range: {0:?}")]
    InvalidRange(String),
    #[error("invalid IP address: {0:?}")]
    InvalidAddress(String),
}

impl ParseError {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            ParseError::InvalidCidr(_) => "invalid-cidr",
            ParseError::InvalidRange(_) => "invalid-range",
            ParseError::InvalidAddress(_) => "invalid-address",
        }
    }

    /// The rejected text.
    pub fn text(&self) -> &str {
        match self {
            ParseError::InvalidCidr(s)
            | ParseError::InvalidRange(s)
            | ParseError::InvalidAddress(s) => s,
        }
    }
}

/// Parse one entry.
///
/// Text containing `/` must be a CIDR network; text containing `-` must be two
/// addresses of one family with `start <= end`; anything else must be a bare
/// IPv4 or IPv6 address. Surrounding whitespace is ignored.
///
/// # Examples
/// ```
/// use cidr_merger::parser::parse;
/// use cidr_merger::AddressRangeVariant;
/// assert!(matches!(parse("10.0.0.0/8"), Ok(AddressRangeVariant::Network(_))));
/// assert!(parse("1.2.3.5-1.2.3.2").is_err());
/// ```
pub fn parse(text: &str) -> Result<AddressRangeVariant, ParseError> {
    let text = text.trim();
    if text.contains('/') {
        return text.parse::<CidrBlock>().map(AddressRangeVariant::Network);
    }
    if let Some((start, end)) = text.split_once('-') {
        let invalid = || ParseError::InvalidRange(text.to_string());
        let start: Address = start.trim().parse().map_err(|_| invalid())?;
        let end: Address = end.trim().parse().map_err(|_| invalid())?;
        return AddressRange::try_new(start, end)
            .map(AddressRangeVariant::Range)
            .ok_or_else(invalid);
    }
    text.parse::<Address>().map(AddressRangeVariant::SingleHost)
}

/// Split a list of entries separated by commas, semicolons or whitespace.
pub fn split_entries(input: &str) -> Vec<&str> {
    ENTRY_SEPARATOR
        .split(input)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

lazy_static! {
    static ref ENTRY_SEPARATOR: Regex = Regex::new(r"[\s,;]+").expect("Invalid Regex?");
}

/// Parse every entry of a batch, skipping the ones that do not parse.
///
/// Each item may itself hold several separated entries (see [`split_entries`]).
/// Malformed entries are expected in observed data and are only logged.
pub fn parse_all<I, S>(entries: I) -> Vec<AddressRangeVariant>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut variants = Vec::new();
    let mut skipped = 0usize;
    for entry in entries {
        for item in split_entries(entry.as_ref()) {
            match parse(item) {
                Ok(variant) => variants.push(variant),
                Err(e) => {
                    skipped += 1;
                    log::debug!("{} {} ({})", "skip".on_red(), e.text(), e.reason());
                }
            }
        }
    }
    if skipped > 0 {
        log::info!("Skipped {skipped} unparsable entries, kept {}", variants.len());
    }
    variants
}
