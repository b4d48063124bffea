//! The top-level driver (spec §4.8, §6 "External Interfaces"): ties the
//! neuron and synapse passes together into the four generated
//! translation units, each wrapped in its own include guard.

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::model::Network;
use crate::sink::EmissionSink;
use crate::{neuron_pass, synapse_pass};

/// One generated translation unit per external interface (spec §6).
/// `synapse_dynamics`/`post_learning` are `None` when no synapse group in
/// the network needs that sub-pass, matching spec §6's "omitted entirely
/// when unused" behavior rather than emitting an empty function body.
#[derive(Debug, Clone)]
pub struct GeneratedSources {
    /// `neuronFnct.cc` — `calcNeuronsCPU`.
    pub neuron_update: String,
    /// `synapseFnct.cc` — `calcSynapsesCPU`.
    pub synapse_update: String,
    /// `synapseDynamicsFnct.cc` — `calcSynapseDynamicsCPU`, if any group needs it.
    pub synapse_dynamics: Option<String>,
    /// `learnPostFnct.cc` — `learnSynapsesPostHost`, if any group needs it.
    pub post_learning: Option<String>,
}

fn include_guard(model: &str, file: &str) -> String {
    format!("{}_{}_cc", model, file)
}

fn open_guard(sink: &mut EmissionSink, model: &str, file: &str) {
    let guard = include_guard(model, file);
    sink.raw(&format!("#ifndef {guard}\n#define {guard}\n\n", guard = guard));
}

fn close_guard(sink: &mut EmissionSink) {
    sink.raw("\n#endif\n");
}

/// Lower a validated [`Network`] into its generated sources.
///
/// Callers must have already run [`Network::validate`] — `generate`
/// assumes a well-formed IR and will panic (via the sink's scope-balance
/// assertion) rather than produce partial output on a malformed one.
pub fn generate(network: &Network, config: &GeneratorConfig) -> Result<GeneratedSources> {
    network.validate()?;

    let neuron_update = generate_neuron_update(network, config);
    let synapse_update = generate_synapse_update(network, config)?;
    let synapse_dynamics = if network.has_any_synapse_dynamics() {
        Some(generate_synapse_dynamics(network, config)?)
    } else {
        None
    };
    let post_learning = if network.has_any_learn_post() {
        Some(generate_post_learning(network, config)?)
    } else {
        None
    };

    Ok(GeneratedSources {
        neuron_update,
        synapse_update,
        synapse_dynamics,
        post_learning,
    })
}

fn generate_neuron_update(network: &Network, config: &GeneratorConfig) -> String {
    let mut sink = EmissionSink::new();
    open_guard(&mut sink, &network.name, "neuronFnct");
    if config.emit_extern_c {
        sink.raw("extern \"C\" {\n");
    }
    sink.line(&format!(
        "void calcNeuronsCPU({} t)",
        network.precision.scalar_type()
    ));
    sink.open_scope();
    for group in &network.neuron_groups {
        neuron_pass::emit_neuron_group(
            &mut sink,
            group,
            network.dt,
            network.precision,
            config.emit_group_comments,
        );
    }
    sink.close_scope();
    if config.emit_extern_c {
        sink.raw("}\n");
    }
    close_guard(&mut sink);
    sink.finish()
}

fn generate_synapse_update(network: &Network, config: &GeneratorConfig) -> Result<String> {
    let mut sink = EmissionSink::new();
    open_guard(&mut sink, &network.name, "synapseFnct");
    if config.emit_extern_c {
        sink.raw("extern \"C\" {\n");
    }
    sink.line(&format!(
        "void calcSynapsesCPU({} t)",
        network.precision.scalar_type()
    ));
    sink.open_scope();
    for sg in &network.synapse_groups {
        synapse_pass::emit_propagation(&mut sink, network, sg, network.precision, config.emit_group_comments)?;
    }
    sink.close_scope();
    if config.emit_extern_c {
        sink.raw("}\n");
    }
    close_guard(&mut sink);
    Ok(sink.finish())
}

fn generate_synapse_dynamics(network: &Network, config: &GeneratorConfig) -> Result<String> {
    let mut sink = EmissionSink::new();
    open_guard(&mut sink, &network.name, "synapseDynamicsFnct");
    if config.emit_extern_c {
        sink.raw("extern \"C\" {\n");
    }
    sink.line(&format!(
        "void calcSynapseDynamicsCPU({} t)",
        network.precision.scalar_type()
    ));
    sink.open_scope();
    for sg in network.synapse_groups_with_dynamics() {
        synapse_pass::emit_synapse_dynamics(&mut sink, network, sg, network.precision, config.emit_group_comments)?;
    }
    sink.close_scope();
    if config.emit_extern_c {
        sink.raw("}\n");
    }
    close_guard(&mut sink);
    Ok(sink.finish())
}

fn generate_post_learning(network: &Network, config: &GeneratorConfig) -> Result<String> {
    let mut sink = EmissionSink::new();
    open_guard(&mut sink, &network.name, "learnPostFnct");
    if config.emit_extern_c {
        sink.raw("extern \"C\" {\n");
    }
    sink.line(&format!(
        "void learnSynapsesPostHost({} t)",
        network.precision.scalar_type()
    ));
    sink.open_scope();
    for sg in network.synapse_groups_with_post_learning() {
        synapse_pass::emit_post_learning(&mut sink, network, sg, network.precision, config.emit_group_comments)?;
    }
    sink.close_scope();
    if config.emit_extern_c {
        sink.raw("}\n");
    }
    close_guard(&mut sink);
    Ok(sink.finish())
}
