//! CRS Value Object
//!
//! A coordinate reference system descriptor: an authority code such as
//! `EPSG:4326` or a full WKT string. Two descriptors match iff their
//! canonical strings are equal. No semantic equivalence is attempted, so two
//! different WKT serializations of the same system are a mismatch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonicalized CRS descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Crs(String);

impl Crs {
    /// Canonicalize a raw descriptor.
    ///
    /// - surrounding whitespace is trimmed
    /// - `authority:code` forms get an upper-cased authority (`epsg:4326` -> `EPSG:4326`)
    /// - OGC URNs collapse to `authority:code`
    ///   (`urn:ogc:def:crs:EPSG::3857` -> `EPSG:3857`,
    ///   `urn:ogc:def:crs:OGC:1.3:CRS84` -> `OGC:CRS84`)
    /// - anything else (WKT, PROJ strings) is kept verbatim
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(canonicalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty descriptor means the data carries no CRS at all
    pub fn is_undefined(&self) -> bool {
        self.0.is_empty()
    }

    /// Split `AUTHORITY:CODE` descriptors
    pub fn authority_code(&self) -> Option<(&str, &str)> {
        let (authority, code) = self.0.split_once(':')?;
        if authority.is_empty() || code.is_empty() || !is_authority(authority) {
            return None;
        }
        Some((authority, code))
    }
}

fn is_authority(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric())
}

const OGC_URN_PREFIX: &str = "urn:ogc:def:crs:";

fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim();

    let lower = trimmed.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix(OGC_URN_PREFIX) {
        // urn:ogc:def:crs:{authority}:{version}:{code}, version may be empty
        let parts: Vec<&str> = rest.split(':').collect();
        if let [authority, _, code] = parts.as_slice() {
            let start = OGC_URN_PREFIX.len();
            let authority = &trimmed[start..start + authority.len()];
            let code = &trimmed[trimmed.len() - code.len()..];
            if let Some(canonical) = authority_code_form(authority, code) {
                return canonical;
            }
        }
    }

    if let Some((authority, code)) = trimmed.split_once(':') {
        if let Some(canonical) = authority_code_form(authority, code) {
            return canonical;
        }
    }

    trimmed.to_string()
}

/// `AUTHORITY:CODE` when both halves are well formed
fn authority_code_form(authority: &str, code: &str) -> Option<String> {
    let code = code.trim();
    let well_formed = !authority.is_empty()
        && !code.is_empty()
        && is_authority(authority)
        && !code.contains(char::is_whitespace)
        && !code.contains([':', '/']);
    well_formed.then(|| format!("{}:{}", authority.to_ascii_uppercase(), code.to_ascii_uppercase()))
}

impl From<String> for Crs {
    fn from(raw: String) -> Self {
        Crs::new(raw)
    }
}

impl From<&str> for Crs {
    fn from(raw: &str) -> Self {
        Crs::new(raw)
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.0
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
