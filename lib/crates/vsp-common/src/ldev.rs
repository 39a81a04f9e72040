//! LDEV identifiers.
//!
//! The array numbers logical devices with a flat decimal id, while operators
//! usually quote them in the hex `CU:LDEV` form printed by storage tooling
//! (`00:0A`, or `00:00:0A` with the LDKC prefix). Both forms parse to the
//! same [`LdevId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest LDEV number addressable on a VSP (`FE:FF`).
pub const MAX_LDEV_ID: u32 = 0xFEFF;

/// Errors produced while parsing an LDEV id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LdevIdError {
    #[error("LDEV id is empty")]
    Empty,

    #[error("invalid LDEV id '{0}': expected a decimal number or hex CU:LDEV (e.g. 00:0A)")]
    Invalid(String),

    #[error("LDEV id {0} is out of range (max {MAX_LDEV_ID})")]
    OutOfRange(u32),
}

/// A validated LDEV number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLdevId", into = "u32")]
pub struct LdevId(u32);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLdevId {
    Number(u32),
    Text(String),
}

impl TryFrom<RawLdevId> for LdevId {
    type Error = LdevIdError;

    fn try_from(raw: RawLdevId) -> Result<Self, Self::Error> {
        match raw {
            RawLdevId::Number(n) => Self::new(n),
            RawLdevId::Text(s) => s.parse(),
        }
    }
}

impl From<LdevId> for u32 {
    fn from(id: LdevId) -> Self {
        id.0
    }
}

impl LdevId {
    /// Wrap a decimal LDEV number, rejecting values above [`MAX_LDEV_ID`].
    pub fn new(id: u32) -> Result<Self, LdevIdError> {
        if id > MAX_LDEV_ID {
            return Err(LdevIdError::OutOfRange(id));
        }
        Ok(Self(id))
    }

    /// The decimal LDEV number used on the wire.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Render as `CU:LDEV` hex, e.g. `00:0A`.
    #[must_use]
    pub fn to_hex_string(self) -> String {
        format!("{:02X}:{:02X}", self.0 >> 8, self.0 & 0xFF)
    }
}

impl fmt::Display for LdevId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LdevId {
    type Err = LdevIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LdevIdError::Empty);
        }
        if !s.contains(':') {
            let id = s
                .parse::<u32>()
                .map_err(|_| LdevIdError::Invalid(s.to_string()))?;
            return Self::new(id);
        }

        let parts = s
            .split(':')
            .map(|p| parse_hex_octet(p).ok_or_else(|| LdevIdError::Invalid(s.to_string())))
            .collect::<Result<Vec<u32>, _>>()?;

        let (cu, ldev) = match parts.as_slice() {
            [cu, ldev] => (*cu, *ldev),
            // LDKC prefix: only LDKC 00 exists on current models.
            [0, cu, ldev] => (*cu, *ldev),
            _ => return Err(LdevIdError::Invalid(s.to_string())),
        };
        Self::new((cu << 8) | ldev)
    }
}

fn parse_hex_octet(part: &str) -> Option<u32> {
    if part.is_empty() || part.len() > 2 {
        return None;
    }
    u32::from_str_radix(part, 16).ok()
}
