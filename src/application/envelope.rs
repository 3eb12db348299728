//! Result envelope
//!
//! The single externally observable artifact of a primitive. Building an
//! envelope has no side effects; the binary entry point writes it once and
//! exits with [`Envelope::exit_code`].

use std::io::{self, Write};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::entities::{Warning, WarningsLedger};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILURE: &str = "failure";

const UNKNOWN_ERROR: &str = "UnknownError";
const NO_DETAILS: &str = "no details provided";

/// Anything that can be flattened into the envelope's `warnings` array
pub trait IntoWarnings {
    fn into_warnings(self) -> Vec<Warning>;
}

impl IntoWarnings for WarningsLedger {
    fn into_warnings(self) -> Vec<Warning> {
        self.into_entries()
    }
}

impl IntoWarnings for &WarningsLedger {
    fn into_warnings(self) -> Vec<Warning> {
        self.entries().to_vec()
    }
}

impl IntoWarnings for Vec<Warning> {
    fn into_warnings(self) -> Vec<Warning> {
        self
    }
}

impl IntoWarnings for &[Warning] {
    fn into_warnings(self) -> Vec<Warning> {
        self.to_vec()
    }
}

impl<T: IntoWarnings> IntoWarnings for Option<T> {
    fn into_warnings(self) -> Vec<Warning> {
        self.map(IntoWarnings::into_warnings).unwrap_or_default()
    }
}

/// Terminal result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    body: Map<String, Value>,
    success: bool,
}

/// Success envelope: `metadata` fields plus `status` and `warnings`.
///
/// A `status`, `warnings` or `error` key already in `metadata` is replaced
/// or dropped. Non-object metadata is nested under `data`.
pub fn primitive_success(metadata: impl Serialize, warnings: impl IntoWarnings) -> Envelope {
    let mut body = match serde_json::to_value(metadata) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Map::new(),
        Ok(other) => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
        Err(err) => {
            return primitive_failure(
                "SerializationError",
                format!("could not serialize metadata: {}", err),
                warnings,
            )
        }
    };

    body.remove("error");
    body.insert("status".to_string(), Value::from(STATUS_SUCCESS));
    body.insert("warnings".to_string(), warnings_value(warnings));

    Envelope {
        body,
        success: true,
    }
}

/// Failure envelope: `{status, error, message, warnings}`
pub fn primitive_failure(
    error: impl Into<String>,
    message: impl Into<String>,
    warnings: impl IntoWarnings,
) -> Envelope {
    let error = non_empty(error.into(), UNKNOWN_ERROR);
    let message = non_empty(message.into(), NO_DETAILS);

    let mut body = Map::new();
    body.insert("status".to_string(), Value::from(STATUS_FAILURE));
    body.insert("error".to_string(), Value::from(error));
    body.insert("message".to_string(), Value::from(message));
    body.insert("warnings".to_string(), warnings_value(warnings));

    Envelope {
        body,
        success: false,
    }
}

fn non_empty(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

fn warnings_value(warnings: impl IntoWarnings) -> Value {
    Value::Array(
        warnings
            .into_warnings()
            .into_iter()
            .map(|w| {
                let mut entry = Map::new();
                entry.insert("level".to_string(), Value::from(w.level.as_str()));
                entry.insert("message".to_string(), Value::from(w.message));
                Value::Object(entry)
            })
            .collect(),
    )
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// 0 on success, 1 on failure
    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }

    /// Compact single-line JSON
    pub fn to_json(&self) -> String {
        Value::Object(self.body.clone()).to_string()
    }

    /// Write the compact JSON object followed by a newline.
    pub fn emit(&self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(self.to_json().as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()
    }
}
