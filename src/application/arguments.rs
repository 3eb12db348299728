//! Argument resolution
//!
//! Turns the raw `<inputs> <output> <params>` triple into [`InvocationArgs`].
//! `inputs` and `params` are each either a path to a JSON document or inline
//! JSON text; `output` is passed through untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::entities::InvocationArgs;
use crate::error::{ArgumentKind, CanopyError, CanopyResult};

/// Resolve an invocation from its three raw arguments.
pub fn resolve(inputs_arg: &str, output_arg: &str, params_arg: &str) -> CanopyResult<InvocationArgs> {
    let inputs = resolve_json(inputs_arg, ArgumentKind::Inputs)?;
    let params = resolve_json(params_arg, ArgumentKind::Params)?;
    tracing::debug!(
        inputs = inputs.len(),
        params = params.len(),
        output = output_arg,
        "arguments resolved"
    );
    Ok(InvocationArgs::new(inputs, output_arg, params))
}

/// Resolve from positional process arguments (program name already stripped).
///
/// Fewer than three arguments is a `UsageError`; extras are ignored.
pub fn resolve_from_args<S: AsRef<str>>(args: &[S]) -> CanopyResult<InvocationArgs> {
    match args {
        [inputs, output, params, ..] => resolve(inputs.as_ref(), output.as_ref(), params.as_ref()),
        _ => Err(CanopyError::usage(format!(
            "expected 3 arguments <inputs> <output> <params>, got {}",
            args.len()
        ))),
    }
}

/// An existing file is read and parsed; anything else is parsed as inline JSON.
fn resolve_json(raw: &str, which: ArgumentKind) -> CanopyResult<Map<String, Value>> {
    let path = Path::new(raw);
    let text = if !raw.is_empty() && path.is_file() {
        fs::read_to_string(path).map_err(|e| CanopyError::ArgumentParse {
            which,
            message: format!("{}: {}", path.display(), e),
        })?
    } else {
        raw.to_string()
    };

    let value: Value = serde_json::from_str(&text).map_err(|e| CanopyError::ArgumentParse {
        which,
        message: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(CanopyError::ArgumentParse {
            which,
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Look up a named input path.
///
/// - absent and `required`: `MissingInput`
/// - absent and optional: `Ok(None)`
/// - present but not a file or directory on disk: `InputNotFound`
pub fn get_input(
    inputs: &Map<String, Value>,
    name: &str,
    required: bool,
) -> CanopyResult<Option<PathBuf>> {
    let raw = match inputs.get(name) {
        None | Some(Value::Null) if required => {
            return Err(CanopyError::MissingInput {
                name: name.to_string(),
            })
        }
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => PathBuf::from(s),
        Some(other) => {
            return Err(CanopyError::InvalidParam {
                name: name.to_string(),
                message: format!("input path must be a string, got {}", json_kind(other)),
            })
        }
    };

    if !raw.exists() {
        return Err(CanopyError::InputNotFound {
            name: name.to_string(),
            path: raw,
        });
    }
    Ok(Some(raw))
}

/// Parameter value or `default` when absent. Never fails.
pub fn get_param(params: &Map<String, Value>, name: &str, default: Value) -> Value {
    params.get(name).cloned().unwrap_or(default)
}

/// Typed parameter: `None` when absent or null, `InvalidParameter` when
/// present with the wrong shape.
pub fn param<T: DeserializeOwned>(params: &Map<String, Value>, name: &str) -> CanopyResult<Option<T>> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| CanopyError::InvalidParam {
                name: name.to_string(),
                message: e.to_string(),
            }),
    }
}
