//! Configuration module for Canopy
//!
//! Configuration hierarchy:
//! 1. Invocation params (highest priority, applied by each primitive)
//! 2. Environment variables (CANOPY_*)
//! 3. Explicit config file (CANOPY_CONFIG)
//! 4. Project config (.canopy/config.toml)
//! 5. User config (~/.config/canopy/config.toml)
//! 6. Built-in defaults (lowest priority)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::services::CrsTarget;

pub const CONFIG_ENV: &str = "CANOPY_CONFIG";
pub const PROJECT_CONFIG_PATH: &str = ".canopy/config.toml";

/// Reconciliation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Repair invalid geometry unless a primitive's params say otherwise
    #[serde(default = "default_true")]
    pub repair: bool,

    /// Which side's CRS wins (1 or 2)
    #[serde(default = "default_transform_to")]
    pub transform_to: u8,

    #[serde(default)]
    pub min_overlap_pct: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            repair: true,
            transform_to: default_transform_to(),
            min_overlap_pct: 0.0,
        }
    }
}

impl ReconcileConfig {
    /// Configured direction; anything but 1 falls back to the default
    pub fn crs_target(&self) -> CrsTarget {
        match self.transform_to {
            1 => CrsTarget::First,
            _ => CrsTarget::Second,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_transform_to() -> u8 {
    2
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub verbosity: Verbosity,
}

/// Verbosity of diagnostics on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Non-fatal configuration warning, folded into the ledger by primitives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
    /// Set when the whole file was rejected
    pub error: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(error) = &self.error {
            return write!(
                f,
                "Ignored config file {}: {}",
                self.file.display(),
                error
            );
        }
        write!(f, "Unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let (config, _warnings) = Self::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> anyhow::Result<(Self, Vec<ConfigWarning>)> {
        let content = fs::read_to_string(path)?;
        Self::parse_with_warnings(&content, path)
    }

    /// Parse TOML text; `path` is only used to label warnings
    pub fn parse_with_warnings(
        content: &str,
        path: &Path,
    ) -> anyhow::Result<(Self, Vec<ConfigWarning>)> {
        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(content);

        let config: Self = serde_ignored::deserialize(deserializer, |p| {
            unknown_paths.push(p.to_string());
        })
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;

        let warnings = unknown_paths
            .into_iter()
            .map(|path_str| {
                let key = path_str
                    .rsplit('.')
                    .next()
                    .unwrap_or(path_str.as_str())
                    .to_string();
                ConfigWarning {
                    line: find_line_number(content, &key),
                    suggestion: suggest_key(&key),
                    key,
                    file: path.to_path_buf(),
                    error: None,
                }
            })
            .collect();

        Ok((config, warnings))
    }

    /// Resolve the config file by priority and apply env overrides.
    ///
    /// Never fails: an unreadable file falls back to the next source and is
    /// reported as a warning.
    pub fn load_or_default(project_root: Option<&Path>) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();

        for candidate in config_candidates(project_root) {
            if !candidate.exists() {
                continue;
            }
            match Self::load_with_warnings(&candidate) {
                Ok((config, mut found)) => {
                    warnings.append(&mut found);
                    return (config.with_env_overrides(), warnings);
                }
                Err(e) => warnings.push(ConfigWarning {
                    key: String::new(),
                    file: candidate.clone(),
                    line: None,
                    suggestion: None,
                    error: Some(e.to_string()),
                }),
            }
        }

        (Self::default().with_env_overrides(), warnings)
    }

    /// Apply environment variable overrides (CANOPY_* prefix)
    pub fn with_env_overrides(mut self) -> Self {
        // CANOPY_VERBOSITY
        if let Ok(verbosity) = std::env::var("CANOPY_VERBOSITY") {
            self.output.verbosity = match verbosity.to_lowercase().as_str() {
                "quiet" => Verbosity::Quiet,
                "verbose" => Verbosity::Verbose,
                "debug" => Verbosity::Debug,
                _ => Verbosity::Normal,
            };
        }

        // CANOPY_REPAIR
        if let Ok(val) = std::env::var("CANOPY_REPAIR") {
            self.reconcile.repair = val.to_lowercase() != "false" && val != "0";
        }

        // CANOPY_TRANSFORM_TO
        if let Ok(val) = std::env::var("CANOPY_TRANSFORM_TO") {
            if let Ok(side @ 1..=2) = val.trim().parse::<u8>() {
                self.reconcile.transform_to = side;
            }
        }

        // CANOPY_MIN_OVERLAP_PCT
        if let Ok(val) = std::env::var("CANOPY_MIN_OVERLAP_PCT") {
            if let Ok(pct) = val.trim().parse::<f64>() {
                if pct.is_finite() {
                    self.reconcile.min_overlap_pct = pct;
                }
            }
        }

        self
    }
}

/// Candidate config files in priority order
fn config_candidates(project_root: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        candidates.push(PathBuf::from(explicit));
    }
    if let Some(root) = project_root {
        candidates.push(root.join(PROJECT_CONFIG_PATH));
    }
    if let Some(user_dir) = user_config_dir() {
        candidates.push(user_dir.join("canopy/config.toml"));
    }
    candidates
}

/// XDG config directory, falling back to the platform default
fn user_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "reconcile",
        "repair",
        "transform_to",
        "min_overlap_pct",
        "output",
        "verbosity",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_bytes.len()]
}
