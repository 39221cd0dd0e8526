//! Capability tags an agent may exercise, and the set type descriptors carry.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An enumerated permission/action tag.
///
/// Declaration order is the canonical serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Read,
    Write,
    Edit,
    Search,
    Execute,
}

/// Capabilities are a set: no duplicates, iteration in canonical order.
pub type CapabilitySet = BTreeSet<Capability>;

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Read,
        Capability::Write,
        Capability::Edit,
        Capability::Search,
        Capability::Execute,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::Write => "write",
            Capability::Edit => "edit",
            Capability::Search => "search",
            Capability::Execute => "execute",
        }
    }

    /// Parse a canonical tag, case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::from_tag(s).ok_or_else(|| {
            format!(
                "unknown capability '{}' (expected one of: read, write, edit, search, execute)",
                s
            )
        })
    }
}

/// Every capability; the default for formats that can represent anything.
pub fn all_capabilities() -> CapabilitySet {
    Capability::ALL.into_iter().collect()
}

/// Render a capability list as `read, write`.
pub fn join_capabilities<'a, I>(caps: I) -> String
where
    I: IntoIterator<Item = &'a Capability>,
{
    caps.into_iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_case_insensitively() {
        assert_eq!(Capability::from_tag("READ"), Some(Capability::Read));
        assert_eq!(Capability::from_tag(" execute "), Some(Capability::Execute));
        assert_eq!(Capability::from_tag("delete"), None);
        assert!("nope".parse::<Capability>().is_err());
    }

    #[test]
    fn set_iterates_in_canonical_order() {
        use Capability::{Edit, Read, Write};
        let set: CapabilitySet = [Edit, Read, Write, Read].into_iter().collect();
        assert_eq!(set.len(), 3);
        assert_eq!(join_capabilities(&set), "read, write, edit");
    }
}
