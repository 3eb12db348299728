//! Provenance envelopes
//!
//! Orchestrator-side wrapper around [`PrimitiveRunner`]: hashes the inputs,
//! runs one primitive, and assembles a pipeline envelope whose provenance
//! chain and warnings are merged from the envelopes it consumed.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Instant, UNIX_EPOCH};

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::runner::{PrimitiveInput, PrimitiveResult, PrimitiveRunner};
use crate::domain::entities::Warning;
use crate::domain::value_objects::Level;
use crate::error::CanopyError;

/// Leading bytes folded into a `dev` profile hash
const DEV_HASH_PREFIX_BYTES: u64 = 1000;

/// How much work input hashing does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashProfile {
    /// Hash every byte
    #[default]
    Full,
    /// Hash size, modification time and the first kilobyte
    Dev,
    /// No hashing
    Test,
}

impl FromStr for HashProfile {
    type Err = CanopyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(HashProfile::Full),
            "dev" => Ok(HashProfile::Dev),
            "test" => Ok(HashProfile::Test),
            other => Err(CanopyError::InvalidParam {
                name: "hash_profile".to_string(),
                message: format!("expected full, dev or test, got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashInfo {
    pub value: Option<String>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HashInfo {
    fn sha256(value: String, method: &str) -> Self {
        Self {
            value: Some(value),
            method: method.to_string(),
            algorithm: Some("sha256".to_string()),
            reason: None,
        }
    }
}

/// Hash a file according to `profile`
pub fn hash_file(profile: HashProfile, path: &Path) -> io::Result<HashInfo> {
    match profile {
        HashProfile::Test => Ok(HashInfo {
            value: None,
            method: "skipped".to_string(),
            algorithm: None,
            reason: Some("test profile".to_string()),
        }),
        HashProfile::Dev => {
            let meta = fs::metadata(path)?;
            let modified = meta
                .modified()?
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or_default();

            let mut hasher = Sha256::new();
            hasher.update(meta.len().to_string().as_bytes());
            hasher.update(modified.to_string().as_bytes());
            let mut head = Vec::new();
            File::open(path)?
                .take(DEV_HASH_PREFIX_BYTES)
                .read_to_end(&mut head)?;
            hasher.update(&head);
            Ok(HashInfo::sha256(format!("{:x}", hasher.finalize()), "metadata"))
        }
        HashProfile::Full => {
            let mut hasher = Sha256::new();
            io::copy(&mut File::open(path)?, &mut hasher)?;
            Ok(HashInfo::sha256(format!("{:x}", hasher.finalize()), "full_file"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub name: String,
    pub semantic_type: String,
    pub path: String,
    pub hash: HashInfo,
}

/// One primitive run in a provenance chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub primitive: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub params: Map<String, Value>,
    pub inputs: Vec<InputRecord>,
    pub duration_seconds: f64,
    /// Name of the input this entry was inherited through; `None` for the
    /// run that produced the envelope
    #[serde(default)]
    pub lineage_branch: Option<String>,
}

/// A ledger entry attributed to the primitive that recorded it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceWarning {
    pub level: Level,
    pub primitive: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataCategory {
    Vector,
    Raster,
    Tabular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRef {
    pub path: String,
    pub format: String,
    #[serde(default)]
    pub secondary: Map<String, Value>,
}

/// A data file together with its metadata, provenance chain and warnings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEnvelope {
    pub data: DataRef,
    pub metadata: Map<String, Value>,
    pub provenance: Vec<ProvenanceEntry>,
    pub warnings: Vec<ProvenanceWarning>,
}

impl PipelineEnvelope {
    pub fn semantic_type(&self) -> Option<&str> {
        self.metadata.get("semantic_type").and_then(Value::as_str)
    }
}

pub fn read_envelope(path: &Path) -> anyhow::Result<PipelineEnvelope> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading envelope {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing envelope {}", path.display()))
}

/// Write `envelope` as indented JSON, creating parent directories
pub fn write_envelope(envelope: &PipelineEnvelope, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(envelope)?;
    fs::write(path, text).with_context(|| format!("writing envelope {}", path.display()))
}

/// An input to a build: the output of an earlier build, or a raw file
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeInput {
    Envelope {
        name: String,
        envelope: PipelineEnvelope,
    },
    Raw {
        name: String,
        path: PathBuf,
        semantic_type: String,
    },
}

impl EnvelopeInput {
    pub fn raw(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        semantic_type: impl Into<String>,
    ) -> Self {
        EnvelopeInput::Raw {
            name: name.into(),
            path: path.into(),
            semantic_type: semantic_type.into(),
        }
    }

    pub fn envelope(name: impl Into<String>, envelope: PipelineEnvelope) -> Self {
        EnvelopeInput::Envelope {
            name: name.into(),
            envelope,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EnvelopeInput::Envelope { name, .. } | EnvelopeInput::Raw { name, .. } => name,
        }
    }

    /// Data path and semantic type handed to the primitive
    fn resolve(&self) -> anyhow::Result<(PathBuf, String)> {
        match self {
            EnvelopeInput::Raw {
                path, semantic_type, ..
            } => Ok((path.clone(), semantic_type.clone())),
            EnvelopeInput::Envelope { name, envelope } => {
                let semantic_type = envelope
                    .semantic_type()
                    .ok_or_else(|| anyhow!("input envelope '{}' has no metadata.semantic_type", name))?;
                Ok((PathBuf::from(&envelope.data.path), semantic_type.to_string()))
            }
        }
    }

    fn inherited(&self) -> Option<&PipelineEnvelope> {
        match self {
            EnvelopeInput::Envelope { envelope, .. } => Some(envelope),
            EnvelopeInput::Raw { .. } => None,
        }
    }
}

/// What to run and how to describe its output
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub primitive: String,
    pub version: String,
    pub output_path: PathBuf,
    pub output_format: String,
    pub semantic_type: String,
    pub data_category: DataCategory,
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Built(PipelineEnvelope),
    Failed { error: String, message: String },
}

/// Runs primitives and wraps their output in provenance envelopes
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    profile: HashProfile,
    runner: PrimitiveRunner,
}

impl EnvelopeBuilder {
    pub fn new(profile: HashProfile, runner: PrimitiveRunner) -> Self {
        Self { profile, runner }
    }

    /// Hash `inputs`, run the primitive, and assemble its envelope.
    ///
    /// Hashing and spawn failures are errors. A primitive that reports
    /// failure yields [`BuildOutcome::Failed`].
    pub fn run(&self, request: &BuildRequest, inputs: &[EnvelopeInput]) -> anyhow::Result<BuildOutcome> {
        let mut primitive_inputs = Vec::with_capacity(inputs.len());
        let mut records = Vec::with_capacity(inputs.len());
        for input in inputs {
            let (path, semantic_type) = input.resolve()?;
            let hash = hash_file(self.profile, &path)
                .with_context(|| format!("hashing input '{}' at {}", input.name(), path.display()))?;
            records.push(InputRecord {
                name: input.name().to_string(),
                semantic_type,
                path: path.to_string_lossy().into_owned(),
                hash,
            });
            primitive_inputs.push(PrimitiveInput::new(input.name(), path));
        }

        let started = Instant::now();
        let result = self.runner.run(
            &request.primitive,
            &primitive_inputs,
            &request.output_path,
            &request.params,
        )?;
        let duration = started.elapsed().as_secs_f64();

        if !result.success {
            tracing::debug!(primitive = %request.primitive, "primitive failed, no envelope built");
            return Ok(BuildOutcome::Failed {
                error: result.error.unwrap_or_else(|| "Unknown error".to_string()),
                message: result.message.unwrap_or_default(),
            });
        }

        Ok(BuildOutcome::Built(assemble(
            request,
            inputs,
            records,
            result,
            duration,
            Utc::now(),
        )))
    }
}

/// Last path segment of a primitive reference
fn short_name(primitive: &str) -> &str {
    primitive.rsplit('/').next().unwrap_or(primitive)
}

fn assemble(
    request: &BuildRequest,
    inputs: &[EnvelopeInput],
    records: Vec<InputRecord>,
    result: PrimitiveResult,
    duration: f64,
    timestamp: DateTime<Utc>,
) -> PipelineEnvelope {
    let primitive = short_name(&request.primitive);

    let mut provenance: Vec<ProvenanceEntry> = Vec::new();
    let mut warnings: Vec<ProvenanceWarning> = Vec::new();
    for input in inputs {
        if let Some(envelope) = input.inherited() {
            provenance.extend(envelope.provenance.iter().cloned().map(|mut entry| {
                if entry.lineage_branch.is_none() {
                    entry.lineage_branch = Some(input.name().to_string());
                }
                entry
            }));
            warnings.extend(envelope.warnings.iter().cloned());
        }
    }
    provenance.push(ProvenanceEntry {
        primitive: primitive.to_string(),
        version: request.version.clone(),
        timestamp,
        params: request.params.clone(),
        inputs: records,
        duration_seconds: (duration * 1000.0).round() / 1000.0,
        lineage_branch: None,
    });
    warnings.extend(result.warnings.into_iter().map(|Warning { level, message }| {
        ProvenanceWarning {
            level,
            primitive: primitive.to_string(),
            message,
        }
    }));

    let mut metadata = result.metadata;
    metadata.remove("warnings");
    metadata.remove("status");
    metadata.insert(
        "semantic_type".to_string(),
        Value::from(request.semantic_type.clone()),
    );
    metadata.insert(
        "data_category".to_string(),
        serde_json::to_value(request.data_category).unwrap_or(Value::Null),
    );

    PipelineEnvelope {
        data: DataRef {
            path: request.output_path.to_string_lossy().into_owned(),
            format: request.output_format.clone(),
            secondary: Map::new(),
        },
        metadata,
        provenance,
        warnings,
    }
}
