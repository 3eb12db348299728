//! Warning Level Value Object
//!
//! Severity of a ledger entry. Only three levels exist; anything else is
//! rejected with [`CanopyError::InvalidLevel`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CanopyError;

/// Severity of a warning recorded during one primitive invocation
///
/// - `Info`: something was adjusted automatically (e.g. a reprojection)
/// - `Warning`: the result is usable but a downstream consumer may care
/// - `Critical`: no meaningful result can be derived from the inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Critical,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Info, Level::Warning, Level::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Critical => "critical",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = CanopyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Level::Info),
            "warning" => Ok(Level::Warning),
            "critical" => Ok(Level::Critical),
            other => Err(CanopyError::InvalidLevel {
                level: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn rejects_unknown_and_mixed_case() {
        for bad in ["error", "INFO", "Warning", "", " info"] {
            let err = bad.parse::<Level>().unwrap_err();
            assert_eq!(err.code(), "InvalidLevel");
        }
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&Level::Critical).unwrap();
        assert_eq!(json, r#""critical""#);
    }
}
