//! Warnings ledger entity
//!
//! Append-only, severity-leveled log owned by exactly one primitive
//! invocation. Entries keep insertion order, which mirrors the order in which
//! checks ran. There is no clear or remove: the ledger is folded into the
//! result envelope when the invocation ends. Appending has no side effects;
//! the entries are logged once, when the envelope is built.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Level;
use crate::error::CanopyResult;

/// A single ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub level: Level,
    pub message: String,
}

impl Warning {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningsLedger {
    entries: Vec<Warning>,
}

impl WarningsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry given a textual level.
    ///
    /// Fails with `InvalidLevel` unless `level` is `info`, `warning` or
    /// `critical`. Nothing is recorded on failure.
    pub fn add(&mut self, level: &str, message: impl Into<String>) -> CanopyResult<()> {
        let level = level.parse::<Level>()?;
        self.record(level, message);
        Ok(())
    }

    /// Append an entry with an already-typed level
    pub fn record(&mut self, level: Level, message: impl Into<String>) {
        self.entries.push(Warning {
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Level::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.record(Level::Warning, message);
    }

    pub fn critical(&mut self, message: impl Into<String>) {
        self.record(Level::Critical, message);
    }

    pub fn has_critical(&self) -> bool {
        self.entries.iter().any(|w| w.level == Level::Critical)
    }

    /// Total entries, or entries at `level` when given
    pub fn count(&self, level: Option<Level>) -> usize {
        match level {
            None => self.entries.len(),
            Some(level) => self.entries.iter().filter(|w| w.level == level).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Warning] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Warning> {
        self.entries
    }
}
