//! Application Layer
//!
//! Use cases that tie the domain to the outside world:
//!
//! - `arguments` - resolve the `<inputs> <output> <params>` triple
//! - `envelope` - build the single result envelope
//! - `primitives` - the primitive lifecycle and the shipped primitives
//! - `provenance` - wrap runner output in hashed, lineage-tracking envelopes
//! - `runner` - invoke a primitive as a subprocess and parse its envelope

pub mod arguments;
pub mod envelope;
pub mod primitives;
pub mod provenance;
pub mod runner;

pub use arguments::{get_input, get_param, param, resolve, resolve_from_args};
pub use envelope::{primitive_failure, primitive_success, Envelope, IntoWarnings};
pub use primitives::{execute, lookup, Primitive, PrimitiveContext, PRIMITIVE_NAMES};
pub use provenance::{
    hash_file, read_envelope, write_envelope, BuildOutcome, BuildRequest, DataCategory,
    EnvelopeBuilder, EnvelopeInput, HashInfo, HashProfile, PipelineEnvelope, ProvenanceEntry,
    ProvenanceWarning,
};
pub use runner::{PrimitiveInput, PrimitiveResult, PrimitiveRunner};
