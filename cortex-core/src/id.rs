//! Prefix-qualified identifiers for cortex entities
//!
//! Every identifier renders in TypeID form, `<prefix>_<suffix>`, where the
//! suffix is a UUIDv7 in 26-character lowercase Crockford base32
//! (`agt_01h455vb4pex5vsknk084sn02q`). Ids of the same kind sort by creation
//! time, both as values and as strings. Parsing also accepts a standard UUID
//! suffix (hyphenated or simple).
//!
//! ```rust
//! use cortex_core::id::RunId;
//!
//! let id = RunId::new();
//! let parsed: RunId = id.to_string().parse().unwrap();
//! assert_eq!(id, parsed);
//! assert!(id.to_string().starts_with("arun_"));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Split `value` into its prefix and UUID, checking the prefix against `expected`.
fn parse_prefixed(value: &str, expected: &str) -> Result<Uuid> {
    if value.is_empty() {
        return Err(Error::invalid_id(value, "empty string"));
    }

    let (prefix, suffix) = value
        .split_once('_')
        .ok_or_else(|| Error::invalid_id(value, "missing '_' separator"))?;

    if prefix != expected {
        return Err(Error::invalid_id(
            value,
            format!("expected prefix {expected:?}, got {prefix:?}"),
        ));
    }

    if suffix.len() == SUFFIX_LEN {
        return decode_suffix(suffix)
            .map(Uuid::from_u128)
            .ok_or_else(|| Error::invalid_id(value, "invalid base32 suffix"));
    }
    Uuid::try_parse(suffix).map_err(|e| Error::invalid_id(value, e.to_string()))
}

const ALPHABET: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";
const SUFFIX_LEN: usize = 26;

/// 128 bits as 26 base32 digits, most significant first
fn encode_suffix(uuid: &Uuid) -> String {
    let bits = uuid.as_u128();
    (0..SUFFIX_LEN)
        .rev()
        .map(|i| ALPHABET[((bits >> (i * 5)) & 0x1f) as usize] as char)
        .collect()
}

fn decode_suffix(suffix: &str) -> Option<u128> {
    // 26 digits carry 130 bits; the leading digit may only use the low 3
    if suffix.as_bytes().first().is_some_and(|&b| b > b'7') {
        return None;
    }
    suffix.bytes().try_fold(0u128, |acc, b| {
        let digit = ALPHABET.iter().position(|&c| c == b)?;
        Some((acc << 5) | digit as u128)
    })
}

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Prefix used in the string form
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new, time-ordered identifier
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", Self::PREFIX, encode_suffix(&self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                parse_prefixed(s, Self::PREFIX).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

prefixed_id!(
    /// Identifier of an agent definition (prefix `agt`)
    AgentId,
    "agt"
);

prefixed_id!(
    /// Identifier of a single agent run (prefix `arun`)
    RunId,
    "arun"
);

prefixed_id!(
    /// Identifier of a human-in-the-loop checkpoint (prefix `acp`)
    CheckpointId,
    "acp"
);

prefixed_id!(
    /// Identifier of a multi-agent orchestration (prefix `orch`)
    OrchestrationId,
    "orch"
);
