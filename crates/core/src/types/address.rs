//! Address kind tag.
//!
//! Every saved address is either a home or a work address. The kind decides
//! which edit endpoint the backend expects (`/address/home/{id}` or
//! `/address/work/{id}`), so it is an enum rather than a free-form string.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown address kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown address type: {0} (expected home or work)")]
pub struct AddressKindError(String);

/// Home or work address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    #[default]
    Home,
    Work,
}

impl AddressKind {
    /// Wire and path segment value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Work => "work",
        }
    }

    /// Capitalized label for display.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Work => "Work",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressKind {
    type Err = AddressKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "work" => Ok(Self::Work),
            _ => Err(AddressKindError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Home".parse::<AddressKind>().unwrap(), AddressKind::Home);
        assert_eq!(" WORK ".parse::<AddressKind>().unwrap(), AddressKind::Work);
        assert!("office".parse::<AddressKind>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&AddressKind::Work).unwrap(),
            "\"work\""
        );
        let kind: AddressKind = serde_json::from_str("\"home\"").unwrap();
        assert_eq!(kind, AddressKind::Home);
    }
}
