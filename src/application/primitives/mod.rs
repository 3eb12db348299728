//! Primitive framework
//!
//! Every primitive follows the same lifecycle: resolve arguments, read
//! through the engine, reconcile and validate, write, extract metadata. The
//! ledger is threaded through every stage and [`execute`] is the only place
//! that turns the outcome into an [`Envelope`].

mod describe_raster;
mod describe_table;
mod reproject_vector;
mod subset_vector;
mod validate_vector;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use serde_json::Value;

pub use describe_raster::DescribeRaster;
pub use describe_table::DescribeTable;
pub use reproject_vector::ReprojectVector;
pub use subset_vector::SubsetVector;
pub use validate_vector::ValidateVector;

use crate::application::arguments::{self, get_input, param};
use crate::application::envelope::{primitive_failure, primitive_success, Envelope};
use crate::config::{Config, ConfigWarning};
use crate::domain::entities::{InvocationArgs, WarningsLedger};
use crate::domain::ports::GeoEngine;
use crate::domain::value_objects::Level;
use crate::error::{CanopyError, CanopyResult};

/// Names accepted on the command line, in help order
pub const PRIMITIVE_NAMES: &[&str] = &[
    ValidateVector::NAME,
    ReprojectVector::NAME,
    SubsetVector::NAME,
    DescribeRaster::NAME,
    DescribeTable::NAME,
];

/// Shared collaborators for one invocation
pub struct PrimitiveContext<'a> {
    pub engine: &'a dyn GeoEngine,
    pub config: &'a Config,
    /// Folded into the ledger before the primitive runs
    pub config_warnings: &'a [ConfigWarning],
}

impl<'a> PrimitiveContext<'a> {
    pub fn new(engine: &'a dyn GeoEngine, config: &'a Config) -> Self {
        Self {
            engine,
            config,
            config_warnings: &[],
        }
    }

    pub fn with_config_warnings(mut self, warnings: &'a [ConfigWarning]) -> Self {
        self.config_warnings = warnings;
        self
    }

    /// `repair` param, falling back to the configured default
    pub fn repair(&self, args: &InvocationArgs) -> CanopyResult<bool> {
        Ok(param::<bool>(args.params(), "repair")?.unwrap_or(self.config.reconcile.repair))
    }
}

/// One spatial-data operation
pub trait Primitive {
    fn name(&self) -> &'static str;

    /// Run to completion and return the domain fields of the success envelope.
    fn run(
        &self,
        ctx: &PrimitiveContext<'_>,
        args: &InvocationArgs,
        ledger: &mut WarningsLedger,
    ) -> CanopyResult<Value>;
}

/// Look up a primitive by its command-line name
pub fn lookup(name: &str) -> Option<Box<dyn Primitive>> {
    match name {
        ValidateVector::NAME => Some(Box::new(ValidateVector)),
        ReprojectVector::NAME => Some(Box::new(ReprojectVector)),
        SubsetVector::NAME => Some(Box::new(SubsetVector)),
        DescribeRaster::NAME => Some(Box::new(DescribeRaster)),
        DescribeTable::NAME => Some(Box::new(DescribeTable)),
        _ => None,
    }
}

/// Resolve `raw_args` (`<inputs> <output> <params>`) and run `primitive`,
/// producing exactly one envelope.
///
/// Errors become failure envelopes carrying the error code; a panic becomes
/// an `InternalError` failure. Entries recorded before the failure are kept.
pub fn execute<S: AsRef<str>>(
    primitive: &dyn Primitive,
    ctx: &PrimitiveContext<'_>,
    raw_args: &[S],
) -> Envelope {
    let mut ledger = WarningsLedger::new();
    for warning in ctx.config_warnings {
        ledger.warning(warning.to_string());
    }

    let span = tracing::info_span!("primitive", name = primitive.name());
    let _guard = span.enter();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let args = arguments::resolve_from_args(raw_args)?;
        primitive.run(ctx, &args, &mut ledger)
    }));
    log_entries(&ledger);

    match outcome {
        Ok(Ok(metadata)) => {
            tracing::info!(warnings = ledger.count(None), "primitive succeeded");
            primitive_success(metadata, ledger)
        }
        Ok(Err(err)) => {
            tracing::info!(error = err.code(), "primitive failed");
            primitive_failure(err.code(), err.to_string(), ledger)
        }
        Err(payload) => {
            let err = CanopyError::Internal {
                message: panic_message(payload.as_ref()),
            };
            tracing::error!("{err}");
            primitive_failure(err.code(), err.to_string(), ledger)
        }
    }
}

fn log_entries(ledger: &WarningsLedger) {
    for entry in ledger.entries() {
        let message = &entry.message;
        match entry.level {
            Level::Info => tracing::info!(target: "canopy::ledger", "{message}"),
            Level::Warning => tracing::warn!(target: "canopy::ledger", "{message}"),
            Level::Critical => tracing::error!(target: "canopy::ledger", "{message}"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Required input path that exists on disk
fn required_input(args: &InvocationArgs, name: &str) -> CanopyResult<PathBuf> {
    get_input(args.inputs(), name, true)?.ok_or_else(|| CanopyError::MissingInput {
        name: name.to_string(),
    })
}

/// Record a `warning` when a requested identifier field is not available
fn check_id_field(
    ledger: &mut WarningsLedger,
    requested: Option<&str>,
    available: &[impl AsRef<str>],
) {
    if let Some(id) = requested {
        if !available.iter().any(|f| f.as_ref() == id) {
            ledger.warning(format!("Identifier field '{}' not found in attributes", id));
        }
    }
}
