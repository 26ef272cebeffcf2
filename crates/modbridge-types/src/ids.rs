//! Newtype identifiers shared across the fleet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque integer identifier for a bot identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotId(pub i64);

impl BotId {
    /// Deterministic worker control-port derivation: `4000 + bot_id`.
    ///
    /// Returns `None` if the derived port would overflow a `u16`.
    pub fn worker_port(self) -> Option<u16> {
        let port = 4000i64 + self.0;
        u16::try_from(port).ok()
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BotId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Upstream-issued room identifier. Opaque from the fleet's perspective --
/// only the upstream chat service assigns meaning to the string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityGuid(pub String);

impl fmt::Display for EntityGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityGuid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityGuid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Upstream account guid identifying a chatting user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserGuid(pub String);

impl fmt::Display for UserGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserGuid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserGuid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier for a shared banned-word preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetId(pub i64);

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_id_port_derivation() {
        assert_eq!(BotId(7).worker_port(), Some(4007));
        assert_eq!(BotId(0).worker_port(), Some(4000));
    }

    #[test]
    fn bot_id_port_overflow_guarded() {
        assert_eq!(BotId(i64::from(u16::MAX) + 10).worker_port(), None);
    }

    #[test]
    fn bot_id_roundtrip() {
        let id: BotId = "42".parse().unwrap();
        assert_eq!(id, BotId(42));
        assert_eq!(id.to_string(), "42");
    }
}
