#![doc = "Neuromorphic IR (NIR) compiler — verification, pass pipeline, and lowering to the code generator's network model.\n\nPublic responsibilities:\n- Op Registry and schema introspection (list_ops) for dialects/ops/versions and attributes\n- Verification (verify_module): presence, type/unit validation, and semantic bounds\n- Pass pipeline (compile_with_passes): verify → canonicalize/upgrade → lower\n- Lowering (compile_module internal): build a shnn_codegen::Network from NIR\n\nKey concepts:\n- Op Registry: Static OpSpec/AttributeSpec array with AttrKind describing attribute kinds/units\n- Verification: Ensures correctness (e.g., lif tau_m > 0; stdp w_min ≤ w_max; valid ranges; dt/duration > 0)\n- Passes: \n  * Canonicalize: expand composite connectivity (e.g., layer_fully_connected → synapse_connect)\n  * UpgradeVersions: scaffold to migrate older op versions to current ones with defaulted attrs\n- Lowering: Produces a shnn_codegen::Network (one neuron group, one synapse group) ready for\n  shnn_codegen::generate to turn into neuron/synapse update source\n\nIntegration points:\n- shnn-ir: Provides Module/Operation and textual printer/parser\n- shnn-codegen: Provides the Network model and the generator itself\n- shnn-cli: Uses verify_module, list_ops, and compile_with_passes to power CLI commands\n\nSee also:\n- crates/shnn-compiler/src/passes.rs for Pass, PassManager, and built-in passes\n- docs/architecture/NIR_DIALECTS_AND_VERSIONING.md for dialects, ops, and versioning policy\n"]

#![deny(missing_docs)]

use std::collections::BTreeSet;

use shnn_ir::{
    AttributeValue, DialectKey, Module, Operation, OpVersion,
};
use shnn_codegen::model::{
    DerivedParam, MergedInSyn, NeuronGroup, NeuronGroupFlags, NeuronModel, PostSynModel,
    Precision, SynapseGroup, VarInit, WeightUpdateModel,
};
use shnn_codegen::{GeneratedSources, GeneratorConfig, Network};

/// Public pass framework (no-op scaffolding)
pub mod passes;

/// Compiler error type
#[derive(thiserror::Error, Debug)]
pub enum CompilerError {
    /// Unsupported operation or version
    #[error("Unsupported op: {dialect}.{name}@{version}")]
    UnsupportedOp {
        /// Dialect
        dialect: String,
        /// Name
        name: String,
        /// Version
        version: String,
    },

    /// Missing required attribute
    #[error("Missing attribute '{0}' in {1}.{2}@{3}")]
    MissingAttr(String, String, String, String),

    /// Attribute type mismatch
    #[error("Bad attribute '{key}' in {dialect}.{name}@{version}: {reason}")]
    BadAttr {
        /// Key
        key: String,
        /// Dialect
        dialect: String,
        /// Name
        name: String,
        /// Version
        version: String,
        /// Reason
        reason: String,
    },

    /// Code-generation error during lowering/building
    #[error("Codegen error: {0}")]
    Codegen(#[from] shnn_codegen::CodegenError),

    /// Generic error
    #[error("{0}")]
    Message(String),
}

/// Result alias for compiler operations
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Attribute kind spec for registry/type checking and introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// Boolean attribute
    Bool,
    /// 64-bit integer attribute
    I64,
    /// 32-bit floating point attribute
    F32,
    /// Duration in nanoseconds
    DurationNs,
    /// Absolute time in nanoseconds
    TimeNs,
    /// Voltage in millivolts
    VoltageMv,
    /// Resistance in megaohms
    ResistanceMohm,
    /// Capacitance in nanofarads
    CapacitanceNf,
    /// Current in nanoamps
    CurrentNa,
    /// Frequency in Hertz
    RateHz,
    /// Dimensionless synaptic weight (f32)
    Weight,
    /// Inclusive u32 range attribute
    RangeU32,
    /// Reference to a neuron by id
    NeuronRef,
}

impl AttrKind {
    /// Human-readable kind name for CLI/docs
    pub fn name(self) -> &'static str {
        match self {
            AttrKind::Bool => "bool",
            AttrKind::I64 => "i64",
            AttrKind::F32 => "f32",
            AttrKind::DurationNs => "DurationNs",
            AttrKind::TimeNs => "TimeNs",
            AttrKind::VoltageMv => "VoltageMv",
            AttrKind::ResistanceMohm => "ResistanceMohm",
            AttrKind::CapacitanceNf => "CapacitanceNf",
            AttrKind::CurrentNa => "CurrentNa",
            AttrKind::RateHz => "RateHz",
            AttrKind::Weight => "Weight(f32)",
            AttrKind::RangeU32 => "RangeU32",
            AttrKind::NeuronRef => "NeuronRef(%n<u32>)",
        }
    }
}

/// Attribute specification (name, kind, required)
#[derive(Debug, Clone, Copy)]
pub struct AttributeSpec {
    /// Attribute key
    pub name: &'static str,
    /// Expected kind/type
    pub kind: AttrKind,
    /// Required attribute (true) or optional (false)
    pub required: bool,
    /// Short doc string
    pub doc: &'static str,
}

/// Operation specification in the registry
#[derive(Debug, Clone, Copy)]
pub struct OpSpec {
    /// Dialect name
    pub dialect: &'static str,
    /// Op name
    pub name: &'static str,
    /// Version number
    pub version: u16,
    /// Attribute specs
    pub attrs: &'static [AttributeSpec],
}

/// Static registry of supported ops (v0)
static OPS: &[OpSpec] = &[
    OpSpec {
        dialect: "neuron",
        name: "lif",
        version: 1,
        attrs: &[
            AttributeSpec { name: "tau_m", kind: AttrKind::DurationNs, required: true, doc: "Membrane time constant (ns)" },
            AttributeSpec { name: "v_rest", kind: AttrKind::VoltageMv, required: true, doc: "Resting potential (mV)" },
            AttributeSpec { name: "v_reset", kind: AttrKind::VoltageMv, required: true, doc: "Reset potential (mV)" },
            AttributeSpec { name: "v_thresh", kind: AttrKind::VoltageMv, required: true, doc: "Threshold potential (mV)" },
            AttributeSpec { name: "t_refrac", kind: AttrKind::DurationNs, required: true, doc: "Refractory period (ns)" },
            AttributeSpec { name: "r_m", kind: AttrKind::ResistanceMohm, required: true, doc: "Membrane resistance (MΩ)" },
            AttributeSpec { name: "c_m", kind: AttrKind::CapacitanceNf, required: true, doc: "Capacitance (nF)" },
        ],
    },
    OpSpec {
        dialect: "plasticity",
        name: "stdp",
        version: 1,
        attrs: &[
            AttributeSpec { name: "a_plus", kind: AttrKind::F32, required: true, doc: "Potentiation amplitude" },
            AttributeSpec { name: "a_minus", kind: AttrKind::F32, required: true, doc: "Depression amplitude" },
            AttributeSpec { name: "tau_plus", kind: AttrKind::DurationNs, required: true, doc: "Potentiation time constant (ns)" },
            AttributeSpec { name: "tau_minus", kind: AttrKind::DurationNs, required: true, doc: "Depression time constant (ns)" },
            AttributeSpec { name: "w_min", kind: AttrKind::F32, required: true, doc: "Minimum weight" },
            AttributeSpec { name: "w_max", kind: AttrKind::F32, required: true, doc: "Maximum weight" },
        ],
    },
    OpSpec {
        dialect: "connectivity",
        name: "layer_fully_connected",
        version: 1,
        attrs: &[
            AttributeSpec { name: "in", kind: AttrKind::RangeU32, required: true, doc: "Inclusive input neuron range" },
            AttributeSpec { name: "out", kind: AttrKind::RangeU32, required: true, doc: "Inclusive output neuron range" },
            AttributeSpec { name: "weight", kind: AttrKind::Weight, required: true, doc: "Initial weight (unitless)" },
            AttributeSpec { name: "delay", kind: AttrKind::DurationNs, required: true, doc: "Synaptic delay (ns)" },
        ],
    },
    OpSpec {
        dialect: "connectivity",
        name: "synapse_connect",
        version: 1,
        attrs: &[
            AttributeSpec { name: "pre", kind: AttrKind::NeuronRef, required: true, doc: "Pre-synaptic neuron id" },
            AttributeSpec { name: "post", kind: AttrKind::NeuronRef, required: true, doc: "Post-synaptic neuron id" },
            AttributeSpec { name: "weight", kind: AttrKind::Weight, required: true, doc: "Synaptic weight (unitless)" },
            AttributeSpec { name: "delay", kind: AttrKind::DurationNs, required: true, doc: "Synaptic delay (ns)" },
        ],
    },
    OpSpec {
        dialect: "stimulus",
        name: "poisson",
        version: 1,
        attrs: &[
            AttributeSpec { name: "neuron", kind: AttrKind::NeuronRef, required: true, doc: "Target neuron id" },
            AttributeSpec { name: "rate", kind: AttrKind::RateHz, required: true, doc: "Firing rate (Hz)" },
            AttributeSpec { name: "amplitude", kind: AttrKind::CurrentNa, required: true, doc: "Current per spike (nA)" },
            AttributeSpec { name: "start", kind: AttrKind::TimeNs, required: true, doc: "Start time (ns)" },
            AttributeSpec { name: "duration", kind: AttrKind::DurationNs, required: true, doc: "Duration (ns)" },
        ],
    },
    OpSpec {
        dialect: "runtime",
        name: "simulate.run",
        version: 1,
        attrs: &[
            AttributeSpec { name: "dt", kind: AttrKind::DurationNs, required: true, doc: "Timestep (ns)" },
            AttributeSpec { name: "duration", kind: AttrKind::DurationNs, required: true, doc: "Total duration (ns)" },
            AttributeSpec { name: "record_potentials", kind: AttrKind::Bool, required: true, doc: "Record membrane potentials" },
            AttributeSpec { name: "seed", kind: AttrKind::I64, required: false, doc: "Optional RNG seed" },
        ],
    },
];

/// List op specifications for CLI introspection
pub fn list_ops() -> &'static [OpSpec] {
    OPS
}

/// Verify that a NIR module is semantically valid (v0 minimal checks).
/// Ensures required attributes exist and have acceptable types/units.
pub fn verify_module(module: &Module) -> Result<()> {
    for op in &module.ops {
        match (&op.dialect, op.name.as_str(), op.version) {
            (DialectKey::Neuron, "lif", OpVersion(1)) => {
                // Presence and type checks
                let tau_m_ns = duration_ns_from_attr(op, "tau_m")?;
                let _t_refrac_ns = duration_ns_from_attr(op, "t_refrac")?;
                let _ = f32_from_attr(op, "v_rest")?;
                let _ = f32_from_attr(op, "v_reset")?;
                let _ = f32_from_attr(op, "v_thresh")?;
                let r_m = f32_from_attr(op, "r_m")?;
                let c_m = f32_from_attr(op, "c_m")?;

                // Semantic/bounds checks
                if tau_m_ns == 0 {
                    return Err(CompilerError::BadAttr {
                        key: "tau_m".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be > 0 ns".into(),
                    });
                }
                if r_m <= 0.0 {
                    return Err(CompilerError::BadAttr {
                        key: "r_m".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be > 0 MΩ".into(),
                    });
                }
                if c_m <= 0.0 {
                    return Err(CompilerError::BadAttr {
                        key: "c_m".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be > 0 nF".into(),
                    });
                }
            }
            (DialectKey::Plasticity, "stdp", OpVersion(1)) => {
                let _ = f32_from_attr(op, "a_plus")?;
                let _ = f32_from_attr(op, "a_minus")?;
                let tau_plus_ns = duration_ns_from_attr(op, "tau_plus")?;
                let tau_minus_ns = duration_ns_from_attr(op, "tau_minus")?;
                let w_min = f32_from_attr(op, "w_min")?;
                let w_max = f32_from_attr(op, "w_max")?;

                if tau_plus_ns == 0 {
                    return Err(CompilerError::BadAttr {
                        key: "tau_plus".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be > 0 ns".into(),
                    });
                }
                if tau_minus_ns == 0 {
                    return Err(CompilerError::BadAttr {
                        key: "tau_minus".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be > 0 ns".into(),
                    });
                }
                if w_min > w_max {
                    return Err(CompilerError::BadAttr {
                        key: "w_min".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be <= w_max".into(),
                    });
                }
            }
            (DialectKey::Connectivity, "layer_fully_connected", OpVersion(1)) => {
                let (in_start, in_end) = range_from_attr(op, "in")?;
                let (out_start, out_end) = range_from_attr(op, "out")?;
                let _ = f32_from_attr(op, "weight")?;
                let _ = duration_ns_from_attr(op, "delay")?;
                if in_start > in_end {
                    return Err(CompilerError::BadAttr {
                        key: "in".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "range must satisfy start <= end".into(),
                    });
                }
                if out_start > out_end {
                    return Err(CompilerError::BadAttr {
                        key: "out".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "range must satisfy start <= end".into(),
                    });
                }
            }
            (DialectKey::Connectivity, "synapse_connect", OpVersion(1)) => {
                let _ = neuron_ref_from_attr(op, "pre")?;
                let _ = neuron_ref_from_attr(op, "post")?;
                let _ = f32_from_attr(op, "weight")?;
                let _ = duration_ns_from_attr(op, "delay")?;
                // Self-connections allowed; no further semantic checks here.
            }
            (DialectKey::Stimulus, "poisson", OpVersion(1)) => {
                let _ = neuron_ref_from_attr(op, "neuron")?;
                let rate = rate_hz_from_attr(op, "rate")?;
                let amp = current_na_from_attr(op, "amplitude")?;
                let _ = time_ns_from_attr(op, "start")?;
                let _ = duration_ns_from_attr(op, "duration")?;

                if rate < 0.0 {
                    return Err(CompilerError::BadAttr {
                        key: "rate".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be >= 0 Hz".into(),
                    });
                }
                if amp < 0.0 {
                    return Err(CompilerError::BadAttr {
                        key: "amplitude".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be >= 0 nA".into(),
                    });
                }
            }
            (DialectKey::Runtime, "simulate.run", OpVersion(1)) => {
                let dt = duration_ns_from_attr(op, "dt")?;
                let dur = duration_ns_from_attr(op, "duration")?;
                let _ = bool_from_attr(op, "record_potentials")?;
                let _ = i64_opt_from_attr(op, "seed")?;

                if dt == 0 {
                    return Err(CompilerError::BadAttr {
                        key: "dt".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be > 0 ns".into(),
                    });
                }
                if dur == 0 {
                    return Err(CompilerError::BadAttr {
                        key: "duration".into(),
                        dialect: op.dialect.to_string(),
                        name: op.name.clone(),
                        version: op.version.to_string(),
                        reason: "must be > 0 ns".into(),
                    });
                }
                // Non-divisible duration is allowed in v0; engine may truncate last partial step.
            }
            (d, n, v) => {
                return Err(CompilerError::UnsupportedOp {
                    dialect: d.to_string(),
                    name: n.to_string(),
                    version: v.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Lowered program produced by the compiler: a fully-resolved network
/// ready to hand to [`shnn_codegen::generate`], plus the generator
/// config the CLI should use unless overridden.
pub struct LoweredProgram {
    /// The network model built from the NIR module.
    pub network: Network,
    /// Default generator configuration for this program.
    pub config: GeneratorConfig,
}

impl LoweredProgram {
    /// Run the code generator over this program's network.
    pub fn generate(&self) -> Result<GeneratedSources> {
        shnn_codegen::generate(&self.network, &self.config).map_err(CompilerError::Codegen)
    }
}

const NEURON_GROUP_NAME: &str = "Neurons";
const SYNAPSE_GROUP_NAME: &str = "Synapses";

/// Compile a NIR module into a [`LoweredProgram`] (one neuron group, one
/// synapse group — all neurons declared in the module share the single
/// `neuron.lif` op's parameters; all synapses declared share the single
/// `plasticity.stdp` op's, if present).
pub fn compile_module(module: &Module) -> Result<LoweredProgram> {
    let mut added_neurons: BTreeSet<u32> = BTreeSet::new();
    let mut lif_params: Option<NeuronModel> = None;
    let mut stdp: Option<WeightUpdateModel> = None;
    let mut edges: Vec<(u32, u32, f32)> = Vec::new();
    let mut has_poisson_stimulus = false;
    let mut dt_ns: Option<u64> = None;

    for op in &module.ops {
        match (&op.dialect, op.name.as_str(), op.version) {
            (DialectKey::Neuron, "lif", OpVersion(1)) => {
                lif_params = Some(lif_neuron_model(op)?);
            }
            (DialectKey::Plasticity, "stdp", OpVersion(1)) => {
                stdp = Some(stdp_weight_update(op)?);
            }
            (DialectKey::Connectivity, "layer_fully_connected", OpVersion(1)) => {
                let (in_start, in_end) = range_from_attr(op, "in")?;
                let (out_start, out_end) = range_from_attr(op, "out")?;
                let weight = f32_from_attr(op, "weight")?;
                for id in in_start..=in_end {
                    added_neurons.insert(id);
                }
                for id in out_start..=out_end {
                    added_neurons.insert(id);
                }
                for pre in in_start..=in_end {
                    for post in out_start..=out_end {
                        edges.push((pre, post, weight));
                    }
                }
            }
            (DialectKey::Connectivity, "synapse_connect", OpVersion(1)) => {
                let pre = neuron_ref_from_attr(op, "pre")?;
                let post = neuron_ref_from_attr(op, "post")?;
                let weight = f32_from_attr(op, "weight")?;
                added_neurons.insert(pre);
                added_neurons.insert(post);
                edges.push((pre, post, weight));
            }
            (DialectKey::Stimulus, "poisson", OpVersion(1)) => {
                let _ = neuron_ref_from_attr(op, "neuron")?;
                let _ = rate_hz_from_attr(op, "rate")?;
                let _ = current_na_from_attr(op, "amplitude")?;
                let _ = time_ns_from_attr(op, "start")?;
                let _ = duration_ns_from_attr(op, "duration")?;
                has_poisson_stimulus = true;
            }
            (DialectKey::Runtime, "simulate.run", OpVersion(1)) => {
                dt_ns = Some(duration_ns_from_attr(op, "dt")?);
            }
            (d, n, v) => {
                return Err(CompilerError::UnsupportedOp {
                    dialect: d.to_string(),
                    name: n.to_string(),
                    version: v.to_string(),
                });
            }
        }
    }

    let mut model = lif_params
        .ok_or_else(|| CompilerError::Message("Missing neuron.lif@1 op (no neuron model)".into()))?;
    if has_poisson_stimulus {
        model.sim_code.push_str(" $(V) += $(dt) * $(Iinj);");
        model.extra_global_param_names.push("Iinj".to_string());
    }

    let size = added_neurons
        .iter()
        .max()
        .map(|m| m + 1)
        .ok_or_else(|| CompilerError::Message("no neurons declared".into()))?;

    if edges.is_empty() {
        return Err(CompilerError::Message("no synapses declared".into()));
    }

    let dt = dt_ns.map(|ns| ns as f64 / 1_000_000.0).unwrap_or(1.0);

    let mut weight_update = stdp.unwrap_or_else(default_weight_update);
    // The constant-weight fast path: no stdp op means every edge carries
    // its own fixed weight, added straight into the accumulator.
    if weight_update.sim_code.is_empty() {
        weight_update.sim_code = "$(addToInSyn, $(g));".to_string();
        weight_update.var_names = vec![VarInit::new("g", "0.0")];
    }

    let neuron_group = NeuronGroup::new(NEURON_GROUP_NAME, size, model)
        .with_flags(NeuronGroupFlags {
            true_spike_required: true,
            ..Default::default()
        })
        .with_merged_in_syn(MergedInSyn {
            psm_target: SYNAPSE_GROUP_NAME.to_string(),
            contributing_synapse_groups: vec![SYNAPSE_GROUP_NAME.to_string()],
            post_syn_model: PostSynModel {
                apply_input_code: "$(Isyn) += $(inSyn);".to_string(),
                decay_code: "$(inSyn) = 0;".to_string(),
                ..Default::default()
            },
            dendritic_delay_required: false,
            max_dendritic_delay_slots: 0,
        });

    let synapse_group = SynapseGroup::new(
        SYNAPSE_GROUP_NAME,
        NEURON_GROUP_NAME,
        NEURON_GROUP_NAME,
        SYNAPSE_GROUP_NAME,
        weight_update,
    );

    let network = Network::new("NirModule", Precision::Single, dt)
        .with_neuron_group(neuron_group)
        .with_synapse_group(synapse_group);

    network.validate()?;

    Ok(LoweredProgram {
        network,
        config: GeneratorConfig::default(),
    })
}

/// Compile with the pass pipeline (canonicalize, version upgrade), then
/// lower to a [`LoweredProgram`]. Runs verification before passes.
pub fn compile_with_passes(module: &Module) -> Result<LoweredProgram> {
    let mut m = module.clone();
    // Verify pre-pass
    verify_module(&m)?;
    // Run no-op passes (canonicalize, version upgrade)
    let mut pm = passes::PassManager::new();
    pm.add(Box::new(passes::CanonicalizePass));
    pm.add(Box::new(passes::UpgradeVersionsPass));
    pm.run(&mut m)?;
    // Lower
    compile_module(&m)
}
// ------------------------- Attribute helpers -------------------------

fn get_attr<'a>(op: &'a Operation, key: &str) -> Result<&'a AttributeValue> {
    op.attrs.get(key).ok_or_else(|| CompilerError::MissingAttr(
        key.to_string(),
        op.dialect.to_string(),
        op.name.clone(),
        op.version.to_string(),
    ))
}

fn bool_from_attr(op: &Operation, key: &str) -> Result<bool> {
    match get_attr(op, key)? {
        AttributeValue::Bool(b) => Ok(*b),
        other => Err(CompilerError::BadAttr {
            key: key.to_string(),
            dialect: op.dialect.to_string(),
            name: op.name.clone(),
            version: op.version.to_string(),
            reason: format!("expected Bool, got {:?}", other),
        }),
    }
}

fn i64_opt_from_attr(op: &Operation, key: &str) -> Result<Option<i64>> {
    match op.attrs.get(key) {
        None => Ok(None),
        Some(AttributeValue::I64(v)) => Ok(Some(*v)),
        Some(other) => Err(CompilerError::BadAttr {
            key: key.to_string(),
            dialect: op.dialect.to_string(),
            name: op.name.clone(),
            version: op.version.to_string(),
            reason: format!("expected I64, got {:?}", other),
        }),
    }
}

fn f32_from_attr(op: &Operation, key: &str) -> Result<f32> {
    match get_attr(op, key)? {
        AttributeValue::F32(v) => Ok(*v),
        AttributeValue::Weight(w) => Ok(*w),
        AttributeValue::VoltageMv(mv) => Ok(*mv),
        AttributeValue::ResistanceMohm(mohm) => Ok(*mohm),
        AttributeValue::CapacitanceNf(nf) => Ok(*nf),
        other => Err(CompilerError::BadAttr {
            key: key.to_string(),
            dialect: op.dialect.to_string(),
            name: op.name.clone(),
            version: op.version.to_string(),
            reason: format!("expected numeric f32-like attr, got {:?}", other),
        }),
    }
}

fn time_ns_from_attr(op: &Operation, key: &str) -> Result<u64> {
    match get_attr(op, key)? {
        AttributeValue::TimeNs(ns) => Ok(*ns),
        other => Err(CompilerError::BadAttr {
            key: key.to_string(),
            dialect: op.dialect.to_string(),
            name: op.name.clone(),
            version: op.version.to_string(),
            reason: format!("expected TimeNs, got {:?}", other),
        }),
    }
}

fn duration_ns_from_attr(op: &Operation, key: &str) -> Result<u64> {
    match get_attr(op, key)? {
        AttributeValue::DurationNs(ns) => Ok(*ns),
        other => Err(CompilerError::BadAttr {
            key: key.to_string(),
            dialect: op.dialect.to_string(),
            name: op.name.clone(),
            version: op.version.to_string(),
            reason: format!("expected DurationNs, got {:?}", other),
        }),
    }
}

fn rate_hz_from_attr(op: &Operation, key: &str) -> Result<f32> {
    match get_attr(op, key)? {
        AttributeValue::RateHz(hz) => Ok(*hz),
        other => Err(CompilerError::BadAttr {
            key: key.to_string(),
            dialect: op.dialect.to_string(),
            name: op.name.clone(),
            version: op.version.to_string(),
            reason: format!("expected RateHz, got {:?}", other),
        }),
    }
}

fn current_na_from_attr(op: &Operation, key: &str) -> Result<f32> {
    match get_attr(op, key)? {
        AttributeValue::CurrentNa(na) => Ok(*na),
        other => Err(CompilerError::BadAttr {
            key: key.to_string(),
            dialect: op.dialect.to_string(),
            name: op.name.clone(),
            version: op.version.to_string(),
            reason: format!("expected CurrentNa, got {:?}", other),
        }),
    }
}

fn neuron_ref_from_attr(op: &Operation, key: &str) -> Result<u32> {
    match get_attr(op, key)? {
        AttributeValue::NeuronRef(id) => Ok(*id),
        other => Err(CompilerError::BadAttr {
            key: key.to_string(),
            dialect: op.dialect.to_string(),
            name: op.name.clone(),
            version: op.version.to_string(),
            reason: format!("expected NeuronRef, got {:?}", other),
        }),
    }
}

fn range_from_attr(op: &Operation, key: &str) -> Result<(u32, u32)> {
    match get_attr(op, key)? {
        AttributeValue::RangeU32 { start, end } => Ok((*start, *end)),
        other => Err(CompilerError::BadAttr {
            key: key.to_string(),
            dialect: op.dialect.to_string(),
            name: op.name.clone(),
            version: op.version.to_string(),
            reason: format!("expected RangeU32, got {:?}", other),
        }),
    }
}

/// Build a standard LIF [`NeuronModel`] from a `neuron.lif@1` op's attributes.
///
/// Durations convert from ns to ms (the unit the generated `sim_code`
/// fragments below are written in, matching `$(dt)`'s substitution).
fn lif_neuron_model(op: &Operation) -> Result<NeuronModel> {
    let tau_m_ns = duration_ns_from_attr(op, "tau_m")?;
    let t_refrac_ns = duration_ns_from_attr(op, "t_refrac")?;
    let v_rest = f32_from_attr(op, "v_rest")?;
    let v_reset = f32_from_attr(op, "v_reset")?;
    let v_thresh = f32_from_attr(op, "v_thresh")?;
    let r_m = f32_from_attr(op, "r_m")?;
    let c_m = f32_from_attr(op, "c_m")?;

    let tau_m_ms = tau_m_ns as f64 / 1_000_000.0;
    let t_refrac_ms = t_refrac_ns as f64 / 1_000_000.0;

    Ok(NeuronModel {
        sim_code: "if ($(RefracTime) <= 0.0) { \
                   $(V) += ($(dt) / $(TauM)) * (($(Vrest) - $(V)) + $(Isyn) * $(Rmembrane)); \
                   } else { $(RefracTime) -= $(dt); }"
            .to_string(),
        threshold_condition_code: "$(RefracTime) <= 0.0 && $(V) >= $(Vthresh)".to_string(),
        reset_code: "$(V) = $(Vreset); $(RefracTime) = $(TauRefrac);".to_string(),
        var_names: vec![
            VarInit::new("V", Precision::Single.literal(v_rest as f64)),
            VarInit::new("RefracTime", "0.0"),
        ],
        derived_param_names: vec![
            DerivedParam::new("TauM", tau_m_ms),
            DerivedParam::new("Vrest", v_rest as f64),
            DerivedParam::new("Vreset", v_reset as f64),
            DerivedParam::new("Vthresh", v_thresh as f64),
            DerivedParam::new("TauRefrac", t_refrac_ms),
            DerivedParam::new("Rmembrane", r_m as f64),
            DerivedParam::new("Cmembrane", c_m as f64),
        ],
        ..Default::default()
    })
}

/// Build a pairwise STDP [`WeightUpdateModel`] from a `plasticity.stdp@1` op's
/// attributes: potentiation on a true presynaptic spike reaching a
/// not-yet-decayed postsynaptic trace, depression in the post-learning pass.
fn stdp_weight_update(op: &Operation) -> Result<WeightUpdateModel> {
    let a_plus = f32_from_attr(op, "a_plus")?;
    let a_minus = f32_from_attr(op, "a_minus")?;
    let tau_plus_ns = duration_ns_from_attr(op, "tau_plus")?;
    let tau_minus_ns = duration_ns_from_attr(op, "tau_minus")?;
    let w_min = f32_from_attr(op, "w_min")?;
    let w_max = f32_from_attr(op, "w_max")?;

    let tau_plus_ms = tau_plus_ns as f64 / 1_000_000.0;
    let tau_minus_ms = tau_minus_ns as f64 / 1_000_000.0;

    Ok(WeightUpdateModel {
        sim_code: "$(addToInSyn, $(g)); \
                   $(g) = fmin($(Wmax), $(g) + $(Aplus));"
            .to_string(),
        learn_post_code: "$(g) = fmax($(Wmin), $(g) - $(Aminus));".to_string(),
        var_names: vec![VarInit::new("g", "0.0")],
        derived_param_names: vec![
            DerivedParam::new("Aplus", a_plus as f64),
            DerivedParam::new("Aminus", a_minus as f64),
            DerivedParam::new("TauPlus", tau_plus_ms),
            DerivedParam::new("TauMinus", tau_minus_ms),
            DerivedParam::new("Wmin", w_min as f64),
            DerivedParam::new("Wmax", w_max as f64),
        ],
        ..Default::default()
    })
}

/// Weight-update model used when no `plasticity.stdp@1` op is present: a
/// bare, fixed per-synapse weight added straight into the accumulator.
fn default_weight_update() -> WeightUpdateModel {
    WeightUpdateModel::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shnn_ir::*;

    #[test]
    fn compile_minimal_program() {
        let mut m = Module::new();
        m.push(lif_neuron_v1(20.0, -70.0, -70.0, -50.0, 2.0, 10.0, 1.0));
        m.push(stdp_rule_v1(0.01, 0.012, 20.0, 20.0, 0.0, 1.0));
        m.push(layer_fully_connected_v1(0, 0, 1, 1, 1.0, 1.0));
        m.push(stimulus_poisson_v1(0, 20.0, 10.0, 0.0, 100.0));
        m.push(runtime_simulate_run_v1(0.1, 10.0, false, Some(42)));

        let program = compile_module(&m).expect("compile");
        assert_eq!(program.network.neuron_groups.len(), 1);
        assert_eq!(program.network.synapse_groups.len(), 1);

        let sources = program.generate().expect("generate");
        assert!(sources.neuron_update.contains("calcNeuronsCPU"));
        assert!(sources.synapse_update.contains("calcSynapsesCPU"));
        assert!(sources.post_learning.is_some());
    }

    #[test]
    fn compile_without_stdp_uses_fixed_weight() {
        let mut m = Module::new();
        m.push(lif_neuron_v1(20.0, -70.0, -70.0, -50.0, 2.0, 10.0, 1.0));
        m.push(synapse_connect_v1(0, 0, 0.5, 1.0));
        m.push(runtime_simulate_run_v1(0.1, 10.0, false, None));

        let program = compile_module(&m).expect("compile");
        assert!(program.network.has_any_learn_post() == false);
        let sources = program.generate().expect("generate");
        assert!(sources.post_learning.is_none());
    }
}