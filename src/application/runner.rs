//! Primitive runner
//!
//! Caller-side counterpart of the execution contract: invokes a primitive as
//! a subprocess, hands it inputs and params as temporary JSON files, and reads
//! back the single envelope from its standard output.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use anyhow::Context;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::domain::entities::Warning;

/// Characters of non-JSON stdout quoted in an `Invalid response` failure
const STDOUT_EXCERPT: usize = 500;

/// One named input handed to a primitive
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveInput {
    pub name: String,
    pub path: PathBuf,
}

impl PrimitiveInput {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Parsed outcome of one subprocess invocation
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveResult {
    pub success: bool,
    pub output_path: Option<PathBuf>,
    /// The whole success envelope; empty on failure
    pub metadata: Map<String, Value>,
    pub warnings: Vec<Warning>,
    pub error: Option<String>,
    pub message: Option<String>,
    pub duration_seconds: Option<f64>,
}

impl PrimitiveResult {
    fn failure(error: impl Into<String>, message: impl Into<String>, warnings: Vec<Warning>) -> Self {
        Self {
            success: false,
            output_path: None,
            metadata: Map::new(),
            warnings,
            error: Some(error.into()),
            message: Some(message.into()),
            duration_seconds: None,
        }
    }
}

/// Runs primitives through a `canopy`-compatible executable
#[derive(Debug, Clone)]
pub struct PrimitiveRunner {
    program: PathBuf,
    working_dir: Option<PathBuf>,
}

impl PrimitiveRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
        }
    }

    /// Run subprocesses from `dir` instead of the current directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Invoke `primitive` and parse its envelope.
    ///
    /// Only spawn and temp-file failures are errors; anything the primitive
    /// reports comes back as a [`PrimitiveResult`].
    pub fn run(
        &self,
        primitive: &str,
        inputs: &[PrimitiveInput],
        output_path: &Path,
        params: &Map<String, Value>,
    ) -> anyhow::Result<PrimitiveResult> {
        let inputs: Map<String, Value> = inputs
            .iter()
            .map(|i| (i.name.clone(), Value::from(i.path.to_string_lossy().into_owned())))
            .collect();

        // Both files are removed when they drop at the end of this call
        let inputs_file = json_tempfile(&Value::Object(inputs)).context("writing inputs file")?;
        let params_file =
            json_tempfile(&Value::Object(params.clone())).context("writing params file")?;

        let mut command = Command::new(&self.program);
        command
            .arg(primitive)
            .arg(inputs_file.path())
            .arg(output_path)
            .arg(params_file.path());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::debug!(program = %self.program.display(), primitive, "spawning primitive");
        let started = Instant::now();
        let output = command
            .output()
            .with_context(|| format!("failed to run {}", self.program.display()))?;
        let elapsed = started.elapsed().as_secs_f64();

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let mut result = parse_response(output.status.success(), &stdout, &stderr, output_path);
        if result.success {
            result.duration_seconds = Some(elapsed);
        }
        Ok(result)
    }
}

fn json_tempfile(value: &Value) -> anyhow::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    serde_json::to_writer(&mut file, value)?;
    file.flush()?;
    Ok(file)
}

/// Turn captured process output into a result.
///
/// Empty stdout counts as an empty envelope.
pub fn parse_response(exit_ok: bool, stdout: &str, stderr: &str, output_path: &Path) -> PrimitiveResult {
    let response: Map<String, Value> = if stdout.trim().is_empty() {
        Map::new()
    } else {
        match serde_json::from_str::<Value>(stdout) {
            Ok(Value::Object(map)) => map,
            _ => {
                let excerpt: String = stdout.chars().take(STDOUT_EXCERPT).collect();
                return PrimitiveResult::failure(
                    "Invalid response",
                    format!("Primitive returned non-JSON output: {}", excerpt),
                    Vec::new(),
                );
            }
        }
    };

    let warnings = response
        .get("warnings")
        .cloned()
        .and_then(|w| serde_json::from_value::<Vec<Warning>>(w).ok())
        .unwrap_or_default();

    if !exit_ok {
        let error = response
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        let message = match response.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None if !stderr.trim().is_empty() => stderr.to_string(),
            None => "Primitive failed".to_string(),
        };
        return PrimitiveResult::failure(error, message, warnings);
    }

    PrimitiveResult {
        success: true,
        output_path: Some(output_path.to_path_buf()),
        metadata: response,
        warnings,
        error: None,
        message: None,
        duration_seconds: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Level;

    #[test]
    fn success_keeps_envelope_and_warnings() {
        let stdout = r#"{"status":"success","feature_count":3,"warnings":[{"level":"info","message":"ok"}]}"#;
        let result = parse_response(true, stdout, "", Path::new("out.geojson"));

        assert!(result.success);
        assert_eq!(result.output_path.as_deref(), Some(Path::new("out.geojson")));
        assert_eq!(result.metadata["feature_count"], 3);
        assert_eq!(result.warnings, vec![Warning::new(Level::Info, "ok")]);
    }

    #[test]
    fn non_json_stdout_is_invalid_response() {
        let noise = "x".repeat(600);
        let result = parse_response(true, &noise, "", Path::new("out"));

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid response"));
        let message = result.message.unwrap();
        assert_eq!(message.matches('x').count(), STDOUT_EXCERPT);
    }

    #[test]
    fn failure_carries_envelope_fields() {
        let stdout = r#"{"status":"failure","error":"ValidationFailure","message":"disjoint","warnings":[{"level":"critical","message":"no overlap"}]}"#;
        let result = parse_response(false, stdout, "ignored", Path::new("out"));

        assert!(!result.success);
        assert_eq!(result.output_path, None);
        assert_eq!(result.error.as_deref(), Some("ValidationFailure"));
        assert_eq!(result.message.as_deref(), Some("disjoint"));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn failure_without_envelope_falls_back_to_stderr() {
        let result = parse_response(false, "", "segfault\n", Path::new("out"));
        assert_eq!(result.error.as_deref(), Some("Unknown error"));
        assert_eq!(result.message.as_deref(), Some("segfault\n"));

        let silent = parse_response(false, "", "", Path::new("out"));
        assert_eq!(silent.message.as_deref(), Some("Primitive failed"));
    }

    #[test]
    fn missing_program_is_an_error() {
        let runner = PrimitiveRunner::new("/definitely/not/a/canopy");
        let result = runner.run("validate-vector", &[], Path::new("out"), &Map::new());
        assert!(result.is_err());
    }
}
