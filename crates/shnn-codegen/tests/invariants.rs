//! Cross-cutting testable properties the generator must uphold
//! regardless of which connectivity kind or model is involved (spec §8).

use shnn_codegen::error::CodegenError;
use shnn_codegen::model::{
    MatrixConnectivity, MergedInSyn, NeuronGroup, NeuronGroupFlags, NeuronModel, PostSynModel,
    Precision, SynapseGroup, VarInit, WeightUpdateModel,
};
use shnn_codegen::subst::{substitute_call, substitute_names};
use shnn_codegen::{generate, GeneratorConfig, Network};
use std::collections::BTreeMap;

fn lif() -> NeuronModel {
    NeuronModel {
        sim_code: "$(V) += 1.0;".to_string(),
        threshold_condition_code: "$(V) >= 1.0".to_string(),
        reset_code: "$(V) = 0.0;".to_string(),
        var_names: vec![VarInit::new("V", "0.0")],
        ..Default::default()
    }
}

/// Invariant: scopes opened by the emitter always balance. `generate`
/// never panics for a valid network; if it ran to completion, every
/// `{` the passes opened has a matching `}`.
#[test]
fn generated_output_has_balanced_braces() {
    let pre = NeuronGroup::new("Pre", 4, lif())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() });
    let post = NeuronGroup::new("Post", 4, lif())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() })
        .with_merged_in_syn(MergedInSyn {
            psm_target: "syn".to_string(),
            contributing_synapse_groups: vec!["syn".to_string()],
            post_syn_model: PostSynModel::default(),
            dendritic_delay_required: false,
            max_dendritic_delay_slots: 0,
        });
    let sg = SynapseGroup::new(
        "syn",
        "Pre",
        "Post",
        "syn",
        WeightUpdateModel {
            sim_code: "$(addToInSyn, 1.0);".to_string(),
            ..Default::default()
        },
    )
    .with_connectivity(MatrixConnectivity::Bitmask);
    let net = Network::new("Net", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);

    let out = generate(&net, &GeneratorConfig::default()).unwrap();
    for text in [
        &out.neuron_update,
        &out.synapse_update,
    ] {
        assert_eq!(text.matches('{').count(), text.matches('}').count());
    }
}

/// Invariant: a malformed IR (dangling neuron reference) is rejected
/// before any emission happens — `generate` returns `Err`, not partial text.
#[test]
fn dangling_reference_rejected_before_emission() {
    let net = Network::new("Net", Precision::Single, 1.0).with_synapse_group(SynapseGroup::new(
        "syn",
        "NoSuchPre",
        "NoSuchPost",
        "syn",
        WeightUpdateModel::default(),
    ));
    let err = generate(&net, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, CodegenError::DanglingNeuronRef { .. }));
}

/// Invariant: SPARSE-RAGGED connectivity without a row stride is rejected.
#[test]
fn sparse_ragged_without_row_stride_rejected() {
    let pre = NeuronGroup::new("Pre", 4, lif());
    let post = NeuronGroup::new("Post", 4, lif());
    let sg = SynapseGroup::new("syn", "Pre", "Post", "syn", WeightUpdateModel::default())
        .with_connectivity(MatrixConnectivity::SparseRagged);
    let net = Network::new("Net", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);
    let err = generate(&net, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, CodegenError::MissingRowStride(_)));
}

/// Invariant: requesting dendritic delay without a buffer-capable merge
/// point on the target is rejected.
#[test]
fn dendritic_delay_without_buffer_rejected() {
    let pre = NeuronGroup::new("Pre", 4, lif());
    let post = NeuronGroup::new("Post", 4, lif()); // no merged_in_syns at all
    let sg = SynapseGroup::new("syn", "Pre", "Post", "syn", WeightUpdateModel::default())
        .with_dendritic_delay(true);
    let net = Network::new("Net", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);
    let err = generate(&net, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, CodegenError::DendriticDelayUnsupported(_)));
}

/// Invariant: a zero-size group is rejected rather than emitting a
/// degenerate `for` loop with bound zero that silently does nothing.
#[test]
fn zero_size_group_rejected() {
    let net = Network::new("Net", Precision::Single, 1.0).with_neuron_group(NeuronGroup::new(
        "Empty",
        0,
        lif(),
    ));
    let err = generate(&net, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, CodegenError::InvalidSize { .. }));
}

/// Invariant: a non-empty neuron population with blank `simCode` is
/// rejected rather than silently generating an update function with no
/// state transition at all.
#[test]
fn empty_sim_code_rejected_for_nonempty_population() {
    let net = Network::new("Net", Precision::Single, 1.0).with_neuron_group(NeuronGroup::new(
        "Silent",
        4,
        NeuronModel::default(),
    ));
    let err = generate(&net, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, CodegenError::EmptySimCode(_)));
}

/// Invariant: name substitution only ever rewrites whole `$(name)`
/// tokens; an unrecognized token is preserved verbatim rather than
/// dropped or partially rewritten.
#[test]
fn unrecognized_tokens_pass_through_unchanged() {
    let mut table = BTreeMap::new();
    table.insert("x".to_string(), "Vmem[n]".to_string());
    let out = substitute_names("$(x) and $(mystery) and $(x)", &table);
    assert_eq!(out, "Vmem[n] and $(mystery) and Vmem[n]");
}

/// Invariant: call substitution with the wrong arity is a hard error,
/// never a best-effort partial expansion.
#[test]
fn call_arity_mismatch_is_an_error_not_a_guess() {
    let err = substitute_call("$(addToInSyn, $(g), $(extra));", "addToInSyn", 1, "X($(0))")
        .unwrap_err();
    assert!(matches!(err, CodegenError::CallArityMismatch { expected: 1, actual: 2, .. }));
}

/// Invariant: generation is deterministic — the same network produces
/// byte-identical output across repeated calls (no hash-map iteration
/// order or time-seeded behavior leaking in).
#[test]
fn generation_is_deterministic() {
    let pre = NeuronGroup::new("Pre", 4, lif())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() });
    let post = NeuronGroup::new("Post", 4, lif())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() })
        .with_merged_in_syn(MergedInSyn {
            psm_target: "syn".to_string(),
            contributing_synapse_groups: vec!["syn".to_string()],
            post_syn_model: PostSynModel::default(),
            dendritic_delay_required: false,
            max_dendritic_delay_slots: 0,
        });
    let sg = SynapseGroup::new(
        "syn",
        "Pre",
        "Post",
        "syn",
        WeightUpdateModel {
            sim_code: "$(addToInSyn, 1.0);".to_string(),
            ..Default::default()
        },
    );
    let net = Network::new("Net", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);

    let a = generate(&net, &GeneratorConfig::default()).unwrap();
    let b = generate(&net, &GeneratorConfig::default()).unwrap();
    assert_eq!(a.neuron_update, b.neuron_update);
    assert_eq!(a.synapse_update, b.synapse_update);
}
