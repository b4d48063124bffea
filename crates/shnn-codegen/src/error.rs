//! Error types for the code generator.

use thiserror::Error;

/// Result type for codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur while generating simulation-step code.
///
/// Unbalanced emission scopes are deliberately *not* a variant here: per
/// the generator's error-handling design, a scope mismatch is a
/// programming error in the emitter, not a condition a caller recovers
/// from (see [`crate::sink::EmissionSink`]).
#[derive(Error, Debug)]
pub enum CodegenError {
    /// A synapse group references a neuron group that does not exist.
    #[error("synapse group '{synapse}' references unknown {role} group '{group}'")]
    DanglingNeuronRef {
        /// Synapse group name
        synapse: String,
        /// "source" or "target"
        role: &'static str,
        /// The missing group name
        group: String,
    },

    /// A neuron or synapse group was declared with a non-positive size.
    #[error("group '{group}' has invalid size {size} (must be > 0)")]
    InvalidSize {
        /// Group name
        group: String,
        /// The offending size
        size: i64,
    },

    /// SPARSE-RAGGED connectivity declared without a positive row stride.
    #[error("synapse group '{0}' is SPARSE-RAGGED but has no max-row-connections")]
    MissingRowStride(String),

    /// Dendritic delay requested without a delay-buffer-capable post-synaptic model.
    #[error("synapse group '{0}' requests dendritic delay but its post-synaptic model has no dendritic-delay buffer")]
    DendriticDelayUnsupported(String),

    /// A neuron population that requires true spikes has no simulation code at all.
    #[error("neuron group '{0}' has empty simCode but is not trivially silent")]
    EmptySimCode(String),

    /// A pseudo-call substitution was invoked with the wrong arity.
    #[error("call substitution '{name}' expects {expected} argument(s), got {actual}")]
    CallArityMismatch {
        /// Pseudo-call name
        name: String,
        /// Declared arity
        expected: usize,
        /// Arity found at the call site
        actual: usize,
    },

    /// Generic message for conditions not covered by a dedicated variant.
    #[error("{0}")]
    Message(String),
}

impl CodegenError {
    /// Build a [`CodegenError::Message`] from any displayable value.
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Message(s.into())
    }
}
