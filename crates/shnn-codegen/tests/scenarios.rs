//! Literal end-to-end generation scenarios: one per connectivity kind
//! plus delay handling, exercised through the public `generate` entry
//! point rather than any single internal module.

use shnn_codegen::model::{
    DerivedParam, MatrixConnectivity, MergedInSyn, NeuronGroup, NeuronGroupFlags, NeuronModel,
    PostSynModel, Precision, SynapseGroup, VarInit, WeightKind, WeightUpdateModel,
};
use shnn_codegen::{generate, GeneratorConfig, Network};

fn lif_model() -> NeuronModel {
    NeuronModel {
        sim_code: "$(V) += $(dt) * (-$(V) + Isyn) / $(tau);".to_string(),
        threshold_condition_code: "$(V) >= 1.0".to_string(),
        reset_code: "$(V) = 0.0;".to_string(),
        var_names: vec![VarInit::new("V", "0.0")],
        derived_param_names: vec![DerivedParam::new("tau", 20.0)],
        ..Default::default()
    }
}

fn psm() -> PostSynModel {
    PostSynModel {
        apply_input_code: "$(Isyn) += $(inSyn);".to_string(),
        decay_code: "$(inSyn) *= 0.9;".to_string(),
        has_individual_vars: false,
        ..Default::default()
    }
}

/// S1: DENSE/INDIVIDUAL connectivity, no delay.
#[test]
fn dense_propagation_generates_full_matrix_loop() {
    let pre = NeuronGroup::new("Pre", 8, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() });
    let post = NeuronGroup::new("Post", 6, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() })
        .with_merged_in_syn(MergedInSyn {
            psm_target: "syn".to_string(),
            contributing_synapse_groups: vec!["syn".to_string()],
            post_syn_model: psm(),
            dendritic_delay_required: false,
            max_dendritic_delay_slots: 0,
        });
    let wu = WeightUpdateModel {
        sim_code: "$(addToInSyn, $(g));".to_string(),
        var_names: vec![VarInit::new("g", "1.0")],
        ..Default::default()
    };
    let sg = SynapseGroup::new("syn", "Pre", "Post", "syn", wu);
    let net = Network::new("S1", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);

    let out = generate(&net, &GeneratorConfig::default()).unwrap();
    assert!(out.synapse_update.contains("for (unsigned int j = 0; j < 6u; j++)"));
    assert!(out.synapse_update.contains("gsyn[ipre * 6u + j]"));
    assert!(out.synapse_update.contains("inSynsyn[ipost] +="));
}

/// S2: BITMASK connectivity — no per-synapse weight array, bit test gates the body.
#[test]
fn bitmask_propagation_tests_packed_bits() {
    let pre = NeuronGroup::new("Pre", 32, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() });
    let post = NeuronGroup::new("Post", 32, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() })
        .with_merged_in_syn(MergedInSyn {
            psm_target: "syn".to_string(),
            contributing_synapse_groups: vec!["syn".to_string()],
            post_syn_model: psm(),
            dendritic_delay_required: false,
            max_dendritic_delay_slots: 0,
        });
    let wu = WeightUpdateModel {
        sim_code: "$(addToInSyn, 1.0);".to_string(),
        ..Default::default()
    };
    let sg = SynapseGroup::new("syn", "Pre", "Post", "syn", wu)
        .with_connectivity(MatrixConnectivity::Bitmask)
        .with_weight_kind(WeightKind::Global);
    let net = Network::new("S2", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);

    let out = generate(&net, &GeneratorConfig::default()).unwrap();
    assert!(out.synapse_update.contains("gpsyn["));
    assert!(!out.synapse_update.contains("weightsyn["));
}

/// S3: SPARSE-YALE connectivity (CSR row bounds from `indInG`).
#[test]
fn sparse_yale_propagation_uses_csr_rows() {
    let pre = NeuronGroup::new("Pre", 100, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() });
    let post = NeuronGroup::new("Post", 50, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() })
        .with_merged_in_syn(MergedInSyn {
            psm_target: "syn".to_string(),
            contributing_synapse_groups: vec!["syn".to_string()],
            post_syn_model: psm(),
            dendritic_delay_required: false,
            max_dendritic_delay_slots: 0,
        });
    let wu = WeightUpdateModel {
        sim_code: "$(addToInSyn, $(g));".to_string(),
        var_names: vec![VarInit::new("g", "1.0")],
        ..Default::default()
    };
    let sg = SynapseGroup::new("syn", "Pre", "Post", "syn", wu)
        .with_connectivity(MatrixConnectivity::SparseYale);
    let net = Network::new("S3", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);

    let out = generate(&net, &GeneratorConfig::default()).unwrap();
    assert!(out.synapse_update.contains("Csyn.indInG[ipre + 1] - Csyn.indInG[ipre]"));
    assert!(out.synapse_update.contains("Csyn.ind[Csyn.indInG[ipre] + j]"));
}

/// S4: SPARSE-RAGGED connectivity with dendritic delay on the contribution.
#[test]
fn sparse_ragged_with_dendritic_delay_writes_ring_buffer() {
    let pre = NeuronGroup::new("Pre", 100, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() });
    let post = NeuronGroup::new("Post", 10, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() })
        .with_merged_in_syn(MergedInSyn {
            psm_target: "syn".to_string(),
            contributing_synapse_groups: vec!["syn".to_string()],
            post_syn_model: psm(),
            dendritic_delay_required: true,
            max_dendritic_delay_slots: 8,
        });
    let wu = WeightUpdateModel {
        sim_code: "$(addToInSynDelay, $(g), $(d));".to_string(),
        var_names: vec![VarInit::new("g", "1.0"), VarInit::new("d", "2.0")],
        ..Default::default()
    };
    let sg = SynapseGroup::new("syn", "Pre", "Post", "syn", wu)
        .with_connectivity(MatrixConnectivity::SparseRagged)
        .with_max_row_connections(16)
        .with_dendritic_delay(true);
    let net = Network::new("S4", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);

    let out = generate(&net, &GeneratorConfig::default()).unwrap();
    assert!(out.synapse_update.contains("denDelaysyn["));
    assert!(out.synapse_update.contains("maxDenDelaysyn"));
    assert!(out.neuron_update.contains("denDelaysyn["));
    assert!(out.neuron_update.contains("dendDelayPtrsyn = (dendDelayPtrsyn + 1) % maxDenDelaysyn;"));
}

/// S5: axonal delay on a DENSE group — propagation reads a past spike slot.
#[test]
fn axonal_delay_reads_past_spike_queue_slot() {
    let pre = NeuronGroup::new("Pre", 8, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, delay_required: true, ..Default::default() })
        .with_delay_slots(4);
    let post = NeuronGroup::new("Post", 6, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() })
        .with_merged_in_syn(MergedInSyn {
            psm_target: "syn".to_string(),
            contributing_synapse_groups: vec!["syn".to_string()],
            post_syn_model: psm(),
            dendritic_delay_required: false,
            max_dendritic_delay_slots: 0,
        });
    let wu = WeightUpdateModel {
        sim_code: "$(addToInSyn, $(g));".to_string(),
        var_names: vec![VarInit::new("g", "1.0")],
        ..Default::default()
    };
    let sg = SynapseGroup::new("syn", "Pre", "Post", "syn", wu).with_axonal_delay_slot(2);
    let net = Network::new("S5", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);

    let out = generate(&net, &GeneratorConfig::default()).unwrap();
    assert!(out.synapse_update.contains("spkQuePtrPre + 4u - 2u"));
}

/// S6: post-learning (STDP-style) sub-pass on a DENSE group.
#[test]
fn post_learning_sub_pass_present_when_learn_post_code_set() {
    let pre = NeuronGroup::new("Pre", 8, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() });
    let post = NeuronGroup::new("Post", 6, lif_model())
        .with_flags(NeuronGroupFlags { true_spike_required: true, ..Default::default() })
        .with_merged_in_syn(MergedInSyn {
            psm_target: "syn".to_string(),
            contributing_synapse_groups: vec!["syn".to_string()],
            post_syn_model: psm(),
            dendritic_delay_required: false,
            max_dendritic_delay_slots: 0,
        });
    let wu = WeightUpdateModel {
        sim_code: "$(addToInSyn, $(g));".to_string(),
        learn_post_code: "$(g) -= 0.01;".to_string(),
        var_names: vec![VarInit::new("g", "1.0")],
        ..Default::default()
    };
    let sg = SynapseGroup::new("syn", "Pre", "Post", "syn", wu);
    let net = Network::new("S6", Precision::Single, 1.0)
        .with_neuron_group(pre)
        .with_neuron_group(post)
        .with_synapse_group(sg);

    let out = generate(&net, &GeneratorConfig::default()).unwrap();
    let post_learning = out.post_learning.expect("learn_post_code set -> file present");
    assert!(post_learning.contains("learnSynapsesPostHost"));
    assert!(post_learning.contains("gsyn[lSpk + 6u * ipre] -= 0.01;"));
}
