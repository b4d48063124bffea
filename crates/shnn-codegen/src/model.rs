//! The typed, read-only network IR consumed by the generator.
//!
//! This is the "fully-resolved network model" of the surrounding spec:
//! owned and constructed by an external model builder (here,
//! `shnn-compiler`'s lowering pass, or a caller building one directly for
//! tests), immutable once handed to [`crate::driver::generate`].

use crate::error::{CodegenError, Result};

/// Floating-point precision advertised by a model; determines the numeric
/// suffix/type used when the driver prints literal constants and the `T`
/// time-precision type named in generated signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// `float` / `f32`
    Single,
    /// `double` / `f64`
    Double,
}

impl Precision {
    /// The scalar type name used in generated signatures.
    pub fn scalar_type(self) -> &'static str {
        match self {
            Precision::Single => "float",
            Precision::Double => "double",
        }
    }

    /// Render a literal constant in this precision (e.g. `20.0f` vs `20.0`).
    pub fn literal(self, value: f64) -> String {
        match self {
            Precision::Single => format!("{}f", value),
            Precision::Double => format!("{}", value),
        }
    }
}

/// Synapse matrix connectivity kind (spec §3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixConnectivity {
    /// Fully materialized `[pre][post]` matrix.
    Dense,
    /// Packed-bit connectivity with no per-synapse weights.
    Bitmask,
    /// Compressed sparse row (`indInG`/`ind`).
    SparseYale,
    /// Fixed-stride sparse rows (`rowLength`, stride = max-row-connections).
    SparseRagged,
}

/// Whether a synapse group carries one shared weight or one weight per synapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightKind {
    /// Single scalar weight shared by every synapse in the group.
    Global,
    /// Per-synapse weight array.
    Individual,
}

/// A named model variable together with the expression that initializes it.
#[derive(Debug, Clone)]
pub struct VarInit {
    /// Variable name (as referenced by `$(name)` in fragments).
    pub name: String,
    /// Initializer expression, already in the target language.
    pub init_expr: String,
}

impl VarInit {
    /// Construct a variable initializer.
    pub fn new(name: impl Into<String>, init_expr: impl Into<String>) -> Self {
        Self { name: name.into(), init_expr: init_expr.into() }
    }
}

/// A derived parameter: a name bound to a precomputed literal constant.
#[derive(Debug, Clone)]
pub struct DerivedParam {
    /// Parameter name.
    pub name: String,
    /// Constant value (rendered through [`Precision::literal`]).
    pub value: f64,
}

impl DerivedParam {
    /// Construct a derived parameter.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value }
    }
}

/// Per-neuron-group model fragments and declared names (spec §3 "Model fragments").
#[derive(Debug, Clone, Default)]
pub struct NeuronModel {
    /// State-update code, run once per neuron per step.
    pub sim_code: String,
    /// Boolean expression; true-spike condition.
    pub threshold_condition_code: String,
    /// Code executed after a true spike is registered.
    pub reset_code: String,
    /// State-update code for a spike-like event (non-threshold transmission trigger).
    pub event_code: String,
    /// Boolean expression guarding `event_code`.
    pub event_threshold_code: String,
    /// State variable names (addressed per §4.4/§4.6) with initial values.
    pub var_names: Vec<VarInit>,
    /// Fixed parameter names, substituted to literal constants.
    pub param_names: Vec<DerivedParam>,
    /// Derived-parameter names, substituted to literal constants.
    pub derived_param_names: Vec<DerivedParam>,
    /// Extra global parameter names, substituted to top-level array references.
    pub extra_global_param_names: Vec<String>,
    /// Namespace prefix used to qualify support-code function names.
    pub support_code_namespace: String,
    /// Support-code function names declared by this model, qualified on substitution.
    pub support_code_names: Vec<String>,
}

/// Per-synapse-group weight-update model fragments (spec §3).
#[derive(Debug, Clone, Default)]
pub struct WeightUpdateModel {
    /// Code run on every true presynaptic spike reaching this synapse.
    pub sim_code: String,
    /// Code run on every qualifying spike-like event.
    pub event_code: String,
    /// Boolean expression guarding `event_code`.
    pub event_threshold_code: String,
    /// Code run per synapse per step (synapse-dynamics sub-pass).
    pub synapse_dynamics_code: String,
    /// Code run per postsynaptic spike over incoming synapses (post-learning sub-pass).
    pub learn_post_code: String,
    /// Per-synapse variable names (weights and any auxiliary state).
    pub var_names: Vec<VarInit>,
    /// Fixed parameter names.
    pub param_names: Vec<DerivedParam>,
    /// Derived-parameter names.
    pub derived_param_names: Vec<DerivedParam>,
    /// Extra global parameter names.
    pub extra_global_param_names: Vec<String>,
    /// Support-code namespace prefix.
    pub support_code_namespace: String,
    /// Support-code function names declared by this model, qualified on substitution.
    pub support_code_names: Vec<String>,
}

impl WeightUpdateModel {
    /// Whether this model requires the synapse-dynamics sub-pass.
    pub fn has_synapse_dynamics(&self) -> bool {
        !self.synapse_dynamics_code.trim().is_empty()
    }

    /// Whether this model requires the post-learning sub-pass.
    pub fn has_learn_post(&self) -> bool {
        !self.learn_post_code.trim().is_empty()
    }

    /// Whether this model ever emits a spike-like event (vs. only true spikes).
    pub fn has_event_code(&self) -> bool {
        !self.event_code.trim().is_empty()
    }
}

/// Per-post-synaptic-model fragments (spec §3/§4.3).
#[derive(Debug, Clone, Default)]
pub struct PostSynModel {
    /// Code converting the accumulated input current into `Isyn`/decaying it.
    pub apply_input_code: String,
    /// Decay code applied to PSM state at the end of the neuron step.
    pub decay_code: String,
    /// PSM-local variable names (only meaningful when individually tracked).
    pub var_names: Vec<VarInit>,
    /// Whether the PSM tracks per-post-neuron individual state (vs. none).
    pub has_individual_vars: bool,
}

/// One incoming synapse group merged into a neuron group's post-synaptic input point.
#[derive(Debug, Clone)]
pub struct MergedInSyn {
    /// Post-synaptic-model instance name (used to namespace `inSyn<psm>`/`denDelay<psm>`).
    pub psm_target: String,
    /// Names of the synapse groups contributing to this merge point.
    pub contributing_synapse_groups: Vec<String>,
    /// The post-synaptic model applied at this merge point.
    pub post_syn_model: PostSynModel,
    /// Whether any contributing synapse group uses dendritic delay.
    pub dendritic_delay_required: bool,
    /// Number of dendritic-delay slots, when required.
    pub max_dendritic_delay_slots: u32,
}

/// Per-neuron-group runtime flags (spec §3).
#[derive(Debug, Clone, Copy, Default)]
pub struct NeuronGroupFlags {
    /// Whether this group maintains a delay queue at all.
    pub delay_required: bool,
    /// Whether spike-like events are emitted.
    pub spike_event_required: bool,
    /// Whether true spikes are emitted.
    pub true_spike_required: bool,
    /// Whether spike times are recorded.
    pub spike_time_required: bool,
    /// Whether the auto-refractory `oldSpike` snapshot is enabled.
    pub auto_refractory_enabled: bool,
    /// Whether this is a Poisson input population (`lrate` rewrite applies).
    pub is_poisson: bool,
}

/// A population of neurons sharing one model (spec §3 "NeuronGroup").
#[derive(Debug, Clone)]
pub struct NeuronGroup {
    /// Group name (used to namespace generated arrays).
    pub name: String,
    /// Number of neurons N.
    pub size: u32,
    /// Neuron model fragments and declared names.
    pub model: NeuronModel,
    /// Runtime flags.
    pub flags: NeuronGroupFlags,
    /// Number of delay-queue slots (meaningful only if `flags.delay_required`).
    pub delay_slots: u32,
    /// Incoming synapse groups, grouped by shared post-synaptic model instance.
    pub merged_in_syns: Vec<MergedInSyn>,
}

impl NeuronGroup {
    /// Construct a neuron group with no delay, no merged inputs, given model and flags.
    pub fn new(name: impl Into<String>, size: u32, model: NeuronModel) -> Self {
        Self {
            name: name.into(),
            size,
            model,
            flags: NeuronGroupFlags::default(),
            delay_slots: 1,
            merged_in_syns: Vec::new(),
        }
    }

    /// Builder-style flag setter.
    pub fn with_flags(mut self, flags: NeuronGroupFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Builder-style delay depth setter; also sets `flags.delay_required`.
    pub fn with_delay_slots(mut self, slots: u32) -> Self {
        self.delay_slots = slots;
        self.flags.delay_required = slots > 1;
        self
    }

    /// Builder-style incoming-synapse attachment.
    pub fn with_merged_in_syn(mut self, merged: MergedInSyn) -> Self {
        self.merged_in_syns.push(merged);
        self
    }
}

/// A population of synapses connecting one source to one target group (spec §3 "SynapseGroup").
#[derive(Debug, Clone)]
pub struct SynapseGroup {
    /// Group name (used to namespace generated arrays).
    pub name: String,
    /// Source (presynaptic) neuron group name.
    pub source: String,
    /// Target (postsynaptic) neuron group name.
    pub target: String,
    /// Connectivity storage kind.
    pub connectivity: MatrixConnectivity,
    /// Weight storage kind.
    pub weight_kind: WeightKind,
    /// Post-synaptic-model target name this group feeds (must match a `MergedInSyn::psm_target`).
    pub psm_target: String,
    /// Whether this group applies dendritic delay to its contribution.
    pub dendritic_delay_required: bool,
    /// Row stride for SPARSE-RAGGED connectivity (required iff `connectivity == SparseRagged`).
    pub max_row_connections: Option<u32>,
    /// Maximum number of source neurons feeding any one target (used by post-learning ragged).
    pub max_source_connections: Option<u32>,
    /// Axonal delay slot index, if the source applies one.
    pub axonal_delay_slot: Option<u32>,
    /// Back-propagation delay slot index, if the target applies one.
    pub back_prop_delay_slot: Option<u32>,
    /// Weight-update model fragments and declared names.
    pub weight_update: WeightUpdateModel,
}

impl SynapseGroup {
    /// Construct a synapse group with DENSE/INDIVIDUAL defaults.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        psm_target: impl Into<String>,
        weight_update: WeightUpdateModel,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            target: target.into(),
            connectivity: MatrixConnectivity::Dense,
            weight_kind: WeightKind::Individual,
            psm_target: psm_target.into(),
            dendritic_delay_required: false,
            max_row_connections: None,
            max_source_connections: None,
            axonal_delay_slot: None,
            back_prop_delay_slot: None,
            weight_update,
        }
    }

    /// Builder-style connectivity setter.
    pub fn with_connectivity(mut self, kind: MatrixConnectivity) -> Self {
        self.connectivity = kind;
        self
    }

    /// Builder-style weight-kind setter.
    pub fn with_weight_kind(mut self, kind: WeightKind) -> Self {
        self.weight_kind = kind;
        self
    }

    /// Builder-style row-stride setter (SPARSE-RAGGED).
    pub fn with_max_row_connections(mut self, max_row: u32) -> Self {
        self.max_row_connections = Some(max_row);
        self
    }

    /// Builder-style max-source-connections setter (post-learning ragged).
    pub fn with_max_source_connections(mut self, max_src: u32) -> Self {
        self.max_source_connections = Some(max_src);
        self
    }

    /// Builder-style axonal delay setter.
    pub fn with_axonal_delay_slot(mut self, slot: u32) -> Self {
        self.axonal_delay_slot = Some(slot);
        self
    }

    /// Builder-style back-prop delay setter.
    pub fn with_back_prop_delay_slot(mut self, slot: u32) -> Self {
        self.back_prop_delay_slot = Some(slot);
        self
    }

    /// Builder-style dendritic delay toggle.
    pub fn with_dendritic_delay(mut self, required: bool) -> Self {
        self.dendritic_delay_required = required;
        self
    }
}

/// The fully-resolved network passed to the generator.
#[derive(Debug, Clone)]
pub struct Network {
    /// Model name (used in include-guard and output file naming).
    pub name: String,
    /// Floating-point precision tag.
    pub precision: Precision,
    /// Simulation timestep.
    pub dt: f64,
    /// Neuron groups, in deterministic declaration order.
    pub neuron_groups: Vec<NeuronGroup>,
    /// Synapse groups, in deterministic declaration order.
    pub synapse_groups: Vec<SynapseGroup>,
}

impl Network {
    /// Construct an empty network.
    pub fn new(name: impl Into<String>, precision: Precision, dt: f64) -> Self {
        Self {
            name: name.into(),
            precision,
            dt,
            neuron_groups: Vec::new(),
            synapse_groups: Vec::new(),
        }
    }

    /// Append a neuron group.
    pub fn with_neuron_group(mut self, group: NeuronGroup) -> Self {
        self.neuron_groups.push(group);
        self
    }

    /// Append a synapse group.
    pub fn with_synapse_group(mut self, group: SynapseGroup) -> Self {
        self.synapse_groups.push(group);
        self
    }

    /// Look up a neuron group by name.
    pub fn neuron_group(&self, name: &str) -> Option<&NeuronGroup> {
        self.neuron_groups.iter().find(|g| g.name == name)
    }

    /// Synapse groups whose weight-update model has non-empty synapse-dynamics code.
    pub fn synapse_groups_with_dynamics(&self) -> impl Iterator<Item = &SynapseGroup> {
        self.synapse_groups.iter().filter(|s| s.weight_update.has_synapse_dynamics())
    }

    /// Synapse groups whose weight-update model has non-empty post-learning code.
    pub fn synapse_groups_with_post_learning(&self) -> impl Iterator<Item = &SynapseGroup> {
        self.synapse_groups.iter().filter(|s| s.weight_update.has_learn_post())
    }

    /// Whether any synapse group requires the synapse-dynamics sub-pass.
    pub fn has_any_synapse_dynamics(&self) -> bool {
        self.synapse_groups_with_dynamics().next().is_some()
    }

    /// Whether any synapse group requires the post-learning sub-pass.
    pub fn has_any_learn_post(&self) -> bool {
        self.synapse_groups_with_post_learning().next().is_some()
    }

    /// Validate cross-references and structural invariants (spec §3, §7 "Malformed IR").
    ///
    /// Checked eagerly, before any emission, so that a malformed IR never
    /// produces partial output.
    pub fn validate(&self) -> Result<()> {
        if self.neuron_groups.is_empty() && self.synapse_groups.is_empty() {
            return Ok(());
        }
        for ng in &self.neuron_groups {
            if ng.size == 0 {
                return Err(CodegenError::InvalidSize { group: ng.name.clone(), size: 0 });
            }
            if ng.model.sim_code.trim().is_empty() {
                return Err(CodegenError::EmptySimCode(ng.name.clone()));
            }
        }
        for sg in &self.synapse_groups {
            if self.neuron_group(&sg.source).is_none() {
                return Err(CodegenError::DanglingNeuronRef {
                    synapse: sg.name.clone(),
                    role: "source",
                    group: sg.source.clone(),
                });
            }
            if self.neuron_group(&sg.target).is_none() {
                return Err(CodegenError::DanglingNeuronRef {
                    synapse: sg.name.clone(),
                    role: "target",
                    group: sg.target.clone(),
                });
            }
            if sg.connectivity == MatrixConnectivity::SparseRagged {
                match sg.max_row_connections {
                    Some(0) | None => return Err(CodegenError::MissingRowStride(sg.name.clone())),
                    _ => {}
                }
            }
            if sg.dendritic_delay_required {
                let trg = self.neuron_group(&sg.target).expect("checked above");
                let psm_has_buffer = trg
                    .merged_in_syns
                    .iter()
                    .any(|m| m.psm_target == sg.psm_target && m.dendritic_delay_required);
                if !psm_has_buffer {
                    return Err(CodegenError::DendriticDelayUnsupported(sg.name.clone()));
                }
            }
        }
        Ok(())
    }
}
