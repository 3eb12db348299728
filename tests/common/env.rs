//! Test environment builder for isolated Canopy runs.
//!
//! `TestEnv` owns a temp project directory and an empty XDG config home, and
//! runs the `canopy` binary from the project root with every `CANOPY_*`
//! variable cleared.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

const CANOPY_VARS: &[&str] = &[
    "CANOPY_CONFIG",
    "CANOPY_LOG",
    "CANOPY_VERBOSITY",
    "CANOPY_REPAIR",
    "CANOPY_TRANSFORM_TO",
    "CANOPY_MIN_OVERLAP_PCT",
];

/// Result of one `canopy` invocation
#[derive(Debug)]
pub struct TestResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// The single envelope on stdout; panics unless stdout is exactly one JSON object line
    pub fn envelope(&self) -> Value {
        let lines: Vec<&str> = self.stdout.lines().collect();
        assert_eq!(
            lines.len(),
            1,
            "expected exactly one stdout line, got:\n{}\nstderr:\n{}",
            self.stdout,
            self.stderr
        );
        let value: Value = serde_json::from_str(lines[0]).unwrap_or_else(|e| {
            panic!("stdout is not JSON ({}): {}", e, self.stdout);
        });
        assert!(value.is_object(), "envelope must be an object: {}", value);
        value
    }

    pub fn status(&self) -> String {
        self.envelope()["status"].as_str().unwrap_or_default().to_string()
    }

    pub fn error(&self) -> Option<String> {
        self.envelope()["error"].as_str().map(str::to_string)
    }

    /// `(level, message)` pairs from the envelope
    pub fn warnings(&self) -> Vec<(String, String)> {
        self.envelope()["warnings"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .map(|w| {
                (
                    w["level"].as_str().unwrap_or_default().to_string(),
                    w["message"].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    pub fn count_level(&self, level: &str) -> usize {
        self.warnings().iter().filter(|(l, _)| l == level).count()
    }
}

/// Isolated project directory plus config home
pub struct TestEnv {
    pub project_root: TempDir,
    pub config_home: TempDir,
    env: Vec<(String, String)>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project_root: TempDir::new().expect("create project dir"),
            config_home: TempDir::new().expect("create config home"),
            env: Vec::new(),
        }
    }

    /// Set an environment variable for every run
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Write a file under the project root, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).expect("read output")
    }

    pub fn bin() -> &'static str {
        env!("CARGO_BIN_EXE_canopy")
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_from(self.project_root.path(), args)
    }

    pub fn run_from(&self, cwd: &Path, args: &[&str]) -> TestResult {
        let mut command = Command::new(Self::bin());
        command
            .args(args)
            .current_dir(cwd)
            .env("XDG_CONFIG_HOME", self.config_home.path());
        for var in CANOPY_VARS {
            command.env_remove(var);
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }

        let output = command.output().expect("failed to run canopy");
        TestResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Run a primitive with inline JSON for inputs and params
    pub fn primitive(&self, name: &str, inputs: &Value, output: &str, params: &Value) -> TestResult {
        let inputs = inputs.to_string();
        let params = params.to_string();
        let output = self.path(output);
        self.run(&[name, &inputs, output.to_str().unwrap_or(""), &params])
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
