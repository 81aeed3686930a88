//! Statistical coarsening of observed addresses.
//!
//! A step `(prefix_len, min_count)` groups entries by the block of length
//! `prefix_len` that contains them. A group with at least `min_count` members
//! is replaced by that block; smaller groups are kept as they are.
//!
//! For example `(16, 10)` turns ten or more addresses under `1.2.0.0/16` into
//! the single block `1.2.0.0/16`.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{AddressFamily, CidrBlock};

/// Rejected aggregation policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("aggregation policy has no steps")]
    Empty,
    #[error("prefix length /{prefix_len} exceeds the {bits}-bit address width")]
    PrefixTooLong { prefix_len: u8, bits: u8 },
    #[error("minimum count for /{0} must be at least 1")]
    ZeroCount(u8),
    #[error("cascading prefix lengths must decrease, got /{previous} then /{next}")]
    NotDecreasing { previous: u8, next: u8 },
    #[error("invalid aggregation step {0:?}, expected prefix:count")]
    InvalidStep(String),
    #[error("unknown aggregation mode {0:?}, expected independent or cascading")]
    UnknownMode(String),
}

/// How the steps of a policy are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Every step runs on the original input; outputs are concatenated.
    Independent,
    /// Each step runs on the coarse output of the previous one; entries still
    /// finer than a step's prefix are set aside and appended at the end.
    Cascading,
}

impl FromStr for AggregationMode {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<AggregationMode, PolicyError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" | "v1" => Ok(AggregationMode::Independent),
            "cascading" | "v2" => Ok(AggregationMode::Cascading),
            _ => Err(PolicyError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AggregationMode::Independent => write!(f, "independent"),
            AggregationMode::Cascading => write!(f, "cascading"),
        }
    }
}

/// One `(prefix_len, min_count)` coarsening step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationStep {
    pub prefix_len: u8,
    pub min_count: usize,
}

impl AggregationStep {
    pub const fn new(prefix_len: u8, min_count: usize) -> AggregationStep {
        AggregationStep {
            prefix_len,
            min_count,
        }
    }
}

impl FromStr for AggregationStep {
    type Err = PolicyError;

    /// Parse `prefix:count`, e.g. `16:10`.
    fn from_str(s: &str) -> Result<AggregationStep, PolicyError> {
        let invalid = || PolicyError::InvalidStep(s.to_string());
        let (prefix_len, min_count) = s.trim().split_once(':').ok_or_else(invalid)?;
        Ok(AggregationStep {
            prefix_len: prefix_len.trim().parse().map_err(|_| invalid())?,
            min_count: min_count.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for AggregationStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.prefix_len, self.min_count)
    }
}

/// Parse a comma, semicolon or whitespace separated list of `prefix:count` steps.
pub fn parse_steps(text: &str) -> Result<Vec<AggregationStep>, PolicyError> {
    crate::parser::split_entries(text)
        .into_iter()
        .map(str::parse)
        .collect()
}

/// Unchecked policy fields, as read from configuration.
#[derive(Deserialize)]
struct PolicyConfig {
    mode: AggregationMode,
    #[serde(default = "default_family")]
    family: AddressFamily,
    steps: Vec<AggregationStep>,
    #[serde(default)]
    reserved: Vec<CidrBlock>,
}

fn default_family() -> AddressFamily {
    AddressFamily::V4
}

impl TryFrom<PolicyConfig> for AggregationPolicy {
    type Error = PolicyError;

    fn try_from(config: PolicyConfig) -> Result<AggregationPolicy, PolicyError> {
        Ok(AggregationPolicy::for_family(config.mode, config.family, config.steps)?
            .with_reserved(config.reserved))
    }
}

/// A validated list of coarsening steps and how to combine them.
///
/// Steps only touch entries of [`AggregationPolicy::family`] (IPv4 unless
/// changed); entries of the other family pass through unchanged. A coarse
/// block never overlaps one of the reserved blocks: the candidate block is
/// narrowed until it clears them, or the entry stands alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyConfig")]
pub struct AggregationPolicy {
    mode: AggregationMode,
    family: AddressFamily,
    steps: Vec<AggregationStep>,
    reserved: Vec<CidrBlock>,
}

impl AggregationPolicy {
    /// Validate and build an IPv4 policy.
    pub fn new(
        mode: AggregationMode,
        steps: Vec<AggregationStep>,
    ) -> Result<AggregationPolicy, PolicyError> {
        AggregationPolicy::for_family(mode, AddressFamily::V4, steps)
    }

    /// Validate and build a policy whose steps apply to `family`.
    pub fn for_family(
        mode: AggregationMode,
        family: AddressFamily,
        steps: Vec<AggregationStep>,
    ) -> Result<AggregationPolicy, PolicyError> {
        let policy = AggregationPolicy {
            mode,
            family,
            steps,
            reserved: Vec::new(),
        };
        policy.validate()?;
        Ok(policy)
    }

    /// One step per prefix in `8, 16, 24, 25 .. 30`, each applied to the raw
    /// input. Larger blocks need more members.
    pub fn independent_default() -> AggregationPolicy {
        AggregationPolicy {
            mode: AggregationMode::Independent,
            family: AddressFamily::V4,
            steps: vec![
                AggregationStep::new(8, 100),
                AggregationStep::new(16, 50),
                AggregationStep::new(24, 25),
                AggregationStep::new(25, 20),
                AggregationStep::new(26, 10),
                AggregationStep::new(27, 5),
                AggregationStep::new(28, 4),
                AggregationStep::new(29, 3),
                AggregationStep::new(30, 2),
            ],
            reserved: Vec::new(),
        }
    }

    /// `/24` for any address, then `/16` from 3 such blocks, then `/8` from 10.
    pub fn cascading_default() -> AggregationPolicy {
        AggregationPolicy {
            mode: AggregationMode::Cascading,
            family: AddressFamily::V4,
            steps: vec![
                AggregationStep::new(24, 1),
                AggregationStep::new(16, 3),
                AggregationStep::new(8, 10),
            ],
            reserved: Vec::new(),
        }
    }

    /// Built-in policy for `mode`.
    pub fn default_for(mode: AggregationMode) -> AggregationPolicy {
        match mode {
            AggregationMode::Independent => AggregationPolicy::independent_default(),
            AggregationMode::Cascading => AggregationPolicy::cascading_default(),
        }
    }

    /// Add blocks that coarse output must never overlap.
    pub fn with_reserved<I>(mut self, reserved: I) -> AggregationPolicy
    where
        I: IntoIterator<Item = CidrBlock>,
    {
        self.reserved.extend(reserved);
        self
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn steps(&self) -> &[AggregationStep] {
        &self.steps
    }

    pub fn reserved(&self) -> &[CidrBlock] {
        &self.reserved
    }

    fn validate(&self) -> Result<(), PolicyError> {
        if self.steps.is_empty() {
            return Err(PolicyError::Empty);
        }
        let bits = self.family.bits();
        for step in &self.steps {
            if step.prefix_len > bits {
                return Err(PolicyError::PrefixTooLong {
                    prefix_len: step.prefix_len,
                    bits,
                });
            }
            if step.min_count == 0 {
                return Err(PolicyError::ZeroCount(step.prefix_len));
            }
        }
        if self.mode == AggregationMode::Cascading {
            if let Some((previous, next)) = self
                .steps
                .iter()
                .tuple_windows()
                .find(|(previous, next)| next.prefix_len >= previous.prefix_len)
            {
                return Err(PolicyError::NotDecreasing {
                    previous: previous.prefix_len,
                    next: next.prefix_len,
                });
            }
        }
        Ok(())
    }
}

/// Block of length `prefix_len` that `entry` would be folded into.
///
/// Entries already at or above `prefix_len` are their own candidate. A
/// candidate overlapping a reserved block is narrowed to the reserved
/// block's prefix (at least one bit per round) until it clears; if that
/// reaches the entry's own size the entry is its own candidate.
fn candidate_block(entry: CidrBlock, prefix_len: u8, reserved: &[CidrBlock]) -> CidrBlock {
    if entry.prefix_len() <= prefix_len {
        return entry;
    }
    let mut candidate = CidrBlock::containing(entry.network(), prefix_len);
    while let Some(conflict) = reserved.iter().find(|r| r.overlaps(&candidate)) {
        let narrower = conflict.prefix_len().max(candidate.prefix_len() + 1);
        if narrower >= entry.prefix_len() {
            return entry;
        }
        candidate = CidrBlock::containing(entry.network(), narrower);
    }
    candidate
}

/// Run one step over `entries`.
///
/// Output is grouped by candidate block in address order; members of a
/// group that stays below the threshold keep their input order.
fn coarsen_step(
    entries: &[CidrBlock],
    step: AggregationStep,
    policy: &AggregationPolicy,
) -> Vec<CidrBlock> {
    let (eligible, passthrough): (Vec<CidrBlock>, Vec<CidrBlock>) = entries
        .iter()
        .partition(|entry| entry.family() == policy.family);

    let keyed = eligible
        .into_iter()
        .map(|entry| (candidate_block(entry, step.prefix_len, &policy.reserved), entry))
        .sorted_by_key(|(candidate, _)| *candidate);

    let mut coarsened = Vec::with_capacity(entries.len());
    let mut replaced = 0usize;
    for (candidate, group) in &keyed.group_by(|(candidate, _)| *candidate) {
        let members: Vec<CidrBlock> = group.map(|(_, entry)| entry).collect();
        if members.len() >= step.min_count {
            log::trace!("{} entries -> {candidate}", members.len());
            replaced += members.len();
            coarsened.push(candidate);
        } else {
            coarsened.extend(members);
        }
    }
    log::debug!(
        "Step /{}>={}: folded {replaced} of {} entries, {} out",
        step.prefix_len,
        step.min_count,
        entries.len(),
        coarsened.len() + passthrough.len()
    );
    coarsened.extend(passthrough);
    coarsened
}

/// Coarsen `entries` with `policy`.
///
/// The output may contain duplicates and overlapping blocks (notably in
/// independent mode); callers merge it afterwards.
///
/// # Examples
/// ```
/// use cidr_merger::processing::{coarsen, AggregationMode, AggregationPolicy, AggregationStep};
/// use cidr_merger::CidrBlock;
/// let hosts: Vec<CidrBlock> = (1..=3).map(|i| format!("1.2.{i}.1/32").parse().unwrap()).collect();
/// let policy = AggregationPolicy::new(AggregationMode::Independent, vec![AggregationStep::new(16, 3)]).unwrap();
/// assert_eq!(coarsen(&hosts, &policy), vec!["1.2.0.0/16".parse::<CidrBlock>().unwrap()]);
/// ```
pub fn coarsen(entries: &[CidrBlock], policy: &AggregationPolicy) -> Vec<CidrBlock> {
    match policy.mode {
        AggregationMode::Independent => policy
            .steps
            .iter()
            .flat_map(|step| coarsen_step(entries, *step, policy))
            .collect(),
        AggregationMode::Cascading => {
            let mut current = entries.to_vec();
            let mut carried = Vec::new();
            for step in &policy.steps {
                let (finer, coarser): (Vec<CidrBlock>, Vec<CidrBlock>) =
                    coarsen_step(&current, *step, policy)
                        .into_iter()
                        .partition(|block| block.prefix_len() > step.prefix_len);
                carried.extend(finer);
                current = coarser;
            }
            current.extend(carried);
            current
        }
    }
}
