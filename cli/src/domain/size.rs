//! Volume capacity strings.
//!
//! Sizes are written the way storage operators write them (`10GB`, `1.5 T`,
//! `500MiB`). Array capacities are binary, so `GB` and `GiB` both mean 2^30.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::ValidationError;

/// The array addresses capacity in 512-byte blocks.
pub const BLOCK_SIZE: u64 = 512;

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern: cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(
        r"(?x)
        ^
        ([0-9]+(?:\.[0-9]+)?)   # 1: number
        [\ \t]*                 # optional space
        ([a-zA-Z]*)             # 2: unit
        $
        ",
    )
    .expect("valid regex")
});

const UNITS: &[(&str, u64)] = &[
    ("B", 1),
    ("K", 1 << 10),
    ("M", 1 << 20),
    ("G", 1 << 30),
    ("T", 1 << 40),
    ("P", 1 << 50),
];

/// A capacity in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Capacity(u64);

impl Capacity {
    #[must_use]
    pub fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn from_blocks(blocks: u64) -> Self {
        Self(blocks.saturating_mul(BLOCK_SIZE))
    }

    #[must_use]
    pub fn bytes(self) -> u64 {
        self.0
    }

    /// Capacity in blocks, rounded up to a whole block.
    #[must_use]
    pub fn blocks(self) -> u64 {
        self.0.div_ceil(BLOCK_SIZE)
    }
}

impl FromStr for Capacity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidField {
            field: "size",
            reason: format!("'{s}' {reason}"),
        };

        let caps = SIZE_RE
            .captures(s.trim())
            .ok_or_else(|| invalid("is not a size such as 10GB or 512MB"))?;
        let number: f64 = caps[1]
            .parse()
            .map_err(|_| invalid("has an unparsable number"))?;

        let unit = caps[2].to_ascii_uppercase();
        if unit.is_empty() {
            return Err(invalid("needs a unit (B, KB, MB, GB, TB, PB)"));
        }
        let prefix = unit
            .strip_suffix("IB")
            .or_else(|| unit.strip_suffix('B').filter(|p| !p.is_empty()))
            .unwrap_or(&unit);
        let multiplier = UNITS
            .iter()
            .find(|(u, _)| *u == prefix)
            .map(|(_, m)| *m)
            .ok_or_else(|| invalid("has an unknown unit"))?;

        #[allow(clippy::cast_precision_loss)]
        let bytes = number * multiplier as f64;
        if !bytes.is_finite() || bytes <= 0.0 || bytes >= u64::MAX as f64 {
            return Err(invalid("must be greater than zero"));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(bytes.ceil() as u64))
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (unit, multiplier) in UNITS.iter().rev() {
            if self.0 >= *multiplier && self.0 % multiplier == 0 {
                let suffix = if *unit == "B" { "" } else { "B" };
                return write!(f, "{}{unit}{suffix}", self.0 / multiplier);
            }
        }
        write!(f, "{}B", self.0)
    }
}
