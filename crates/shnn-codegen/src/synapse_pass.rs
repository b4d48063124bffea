//! The synapse pass emitter (spec §4.7): three independent sub-passes
//! over a [`SynapseGroup`] — synapse dynamics, spike/event propagation,
//! and post-learning — each lowering into its own top-level function
//! body (`calcSynapseDynamicsCPU`, `calcSynapsesCPU`, `learnSynapsesPostHost`).

use crate::delay;
use crate::model::{Network, Precision, SynapseGroup};
use crate::sink::EmissionSink;
use crate::{indexing, stdlib};

fn substitute_common(
    fragment: &str,
    sg: &SynapseGroup,
    precision: Precision,
    id_expr: &str,
) -> String {
    let mut f = fragment.to_string();
    f = stdlib::substitute_time(&f, "t");
    f = stdlib::substitute_params(&f, &sg.weight_update.param_names, precision);
    f = stdlib::substitute_params(&f, &sg.weight_update.derived_param_names, precision);
    f = stdlib::substitute_egps(&f, &sg.weight_update.extra_global_param_names, &sg.name);
    f = stdlib::substitute_support_code(
        &f,
        &sg.weight_update.support_code_names,
        &sg.weight_update.support_code_namespace,
    );
    stdlib::substitute_id(&f, id_expr)
}

fn substitute_synapse_vars(fragment: &str, sg: &SynapseGroup, slot_expr: Option<&str>) -> String {
    stdlib::substitute_vars(fragment, &sg.weight_update.var_names, |name| match slot_expr {
        Some(slot) => Some(format!("{var}{grp}[{slot}]", var = name, grp = sg.name, slot = slot)),
        None => sg
            .weight_update
            .var_names
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.init_expr.clone()),
    })
}

/// Apply the `addToInSyn`/`addToInSynDelay` rewrite, then the deprecated
/// alias expansion, in that order — each may leave tokens for the other
/// to resolve, which is why both run over every weight-update fragment.
fn apply_accumulator_rewrites(
    fragment: &str,
    sg: &SynapseGroup,
    target_size: u32,
) -> crate::error::Result<String> {
    let mut f = stdlib::rewrite_add_to_in_syn(fragment, &sg.psm_target)?;
    f = stdlib::rewrite_add_to_in_syn_delay(&f, &sg.psm_target, &sg.psm_target, target_size)?;
    if stdlib::references_deprecated_linsyn(&f) {
        f = stdlib::expand_updatelinsyn(&f);
        f = stdlib::resolve_in_syn_aliases(&f, &sg.psm_target);
    }
    Ok(f)
}

/// Emit the synapse-dynamics sub-pass body for `sg` (spec §4.7, sub-pass 1).
///
/// Runs unconditionally once per synapse per step — no spike gating.
pub fn emit_synapse_dynamics(
    sink: &mut EmissionSink,
    network: &Network,
    sg: &SynapseGroup,
    precision: Precision,
    group_comments: bool,
) -> crate::error::Result<()> {
    if !sg.weight_update.has_synapse_dynamics() {
        return Ok(());
    }
    let target = network.neuron_group(&sg.target).expect("validated");
    if group_comments {
        sink.line(&format!("// synapse dynamics: {}", sg.name));
    }
    sink.line(&format!(
        "for (unsigned int ipre = 0; ipre < {}u; ipre++)",
        source_size(network, sg)
    ));
    sink.open_scope();
    let fl = indexing::forward_loop(sg, target.size);
    sink.line(&format!("for (unsigned int j = 0; j < {}; j++)", fl.row_length_expr));
    sink.open_scope();
    sink.line(&format!("const unsigned int ipost = {};", fl.ipost_expr));
    if let Some(gid_rhs) = &fl.gid_decl_expr {
        sink.line(&format!("const uint64_t gid = ({});", gid_rhs));
    }
    if let Some(guard) = &fl.bitmask_guard_expr {
        sink.line(&format!("if ({})", guard));
        sink.open_scope();
    }
    let mut code = sg.weight_update.synapse_dynamics_code.clone();
    code = substitute_common(&code, sg, precision, "ipost");
    code = substitute_synapse_vars(&code, sg, fl.var_slot_expr.as_deref());
    code = apply_accumulator_rewrites(&code, sg, target.size)?;
    for line in code.lines() {
        sink.line(line);
    }
    if fl.bitmask_guard_expr.is_some() {
        sink.close_scope();
    }
    sink.close_scope();
    sink.close_scope();
    Ok(())
}

/// Emit the spike/event propagation sub-pass body for `sg` (spec §4.7,
/// sub-pass 2): iterate presynaptic neurons that fired this step, and for
/// each, every outgoing synapse per the connectivity's forward addressing.
pub fn emit_propagation(
    sink: &mut EmissionSink,
    network: &Network,
    sg: &SynapseGroup,
    precision: Precision,
    group_comments: bool,
) -> crate::error::Result<()> {
    let source = network.neuron_group(&sg.source).expect("validated");
    let target = network.neuron_group(&sg.target).expect("validated");
    if group_comments {
        sink.line(&format!("// synapse propagation: {}", sg.name));
    }

    // Event-spike propagation (if present) textually precedes true-spike
    // propagation for the same group (spec §8 Invariant 3).
    if sg.weight_update.has_event_code() {
        emit_spike_loop(sink, sg, source, target, precision, true, &sg.weight_update.event_code)?;
    }
    emit_spike_loop(sink, sg, source, target, precision, false, &sg.weight_update.sim_code)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn emit_spike_loop(
    sink: &mut EmissionSink,
    sg: &SynapseGroup,
    source: &crate::model::NeuronGroup,
    target: &crate::model::NeuronGroup,
    precision: Precision,
    is_event: bool,
    code: &str,
) -> crate::error::Result<()> {
    let (count_expr, offset_expr) = spike_source_addressing(source, sg.axonal_delay_slot, is_event);
    sink.line(&format!("for (unsigned int i = 0; i < {}; i++)", count_expr));
    sink.open_scope();
    let spk_array = if is_event {
        format!("glbSpkEvnt{}", source.name)
    } else {
        format!("glbSpk{}", source.name)
    };
    sink.line(&format!("const unsigned int ipre = {spk}[{off} + i];", spk = spk_array, off = offset_expr));

    let fl = indexing::forward_loop(sg, target.size);
    let has_event_guard = is_event && !sg.weight_update.event_threshold_code.trim().is_empty();
    let event_guard_expr = if has_event_guard {
        let mut guard = sg.weight_update.event_threshold_code.clone();
        guard = substitute_common(&guard, sg, precision, "ipre");
        guard = substitute_synapse_vars(&guard, sg, None);
        Some(guard)
    } else {
        None
    };

    // BITMASK connectivity needs `ipost` to compute `gid`, so its guard
    // (and any event condition) is combined into a single per-synapse
    // `if` (spec §8 S3) rather than gating the whole per-synapse loop at
    // the ipre level the way other connectivity kinds do.
    let event_guard_at_ipre_level = has_event_guard && fl.bitmask_guard_expr.is_none();
    if event_guard_at_ipre_level {
        sink.line(&format!("if ({})", event_guard_expr.as_deref().unwrap()));
        sink.open_scope();
    }

    sink.line(&format!("for (unsigned int j = 0; j < {}; j++)", fl.row_length_expr));
    sink.open_scope();
    sink.line(&format!("const unsigned int ipost = {};", fl.ipost_expr));
    if let Some(gid_rhs) = &fl.gid_decl_expr {
        sink.line(&format!("const uint64_t gid = ({});", gid_rhs));
    }
    let opened_guard_scope = if let Some(bitmask_guard) = &fl.bitmask_guard_expr {
        let cond = match &event_guard_expr {
            Some(event_cond) => format!("({}) && ({})", bitmask_guard, event_cond),
            None => bitmask_guard.clone(),
        };
        sink.line(&format!("if ({})", cond));
        sink.open_scope();
        true
    } else {
        false
    };
    let mut body = code.to_string();
    body = substitute_common(&body, sg, precision, "ipre");
    body = substitute_synapse_vars(&body, sg, fl.var_slot_expr.as_deref());
    body = apply_accumulator_rewrites(&body, sg, target.size)?;
    for line in body.lines() {
        sink.line(line);
    }
    if opened_guard_scope {
        sink.close_scope();
    }
    sink.close_scope();

    if event_guard_at_ipre_level {
        sink.close_scope();
    }
    sink.close_scope();
    Ok(())
}

/// Emit the post-learning sub-pass body for `sg` (spec §4.7, sub-pass 3):
/// iterate postsynaptic neurons that fired this step (subject to
/// back-propagation delay), and for each, every incoming synapse per the
/// connectivity's reverse addressing.
pub fn emit_post_learning(
    sink: &mut EmissionSink,
    network: &Network,
    sg: &SynapseGroup,
    precision: Precision,
    group_comments: bool,
) -> crate::error::Result<()> {
    if !sg.weight_update.has_learn_post() {
        return Ok(());
    }
    let source = network.neuron_group(&sg.source).expect("validated");
    let target = network.neuron_group(&sg.target).expect("validated");
    if group_comments {
        sink.line(&format!("// post-learning: {}", sg.name));
    }

    let (count_expr, offset_expr) =
        spike_source_addressing(target, sg.back_prop_delay_slot, false);
    sink.line(&format!("for (unsigned int i = 0; i < {}; i++)", count_expr));
    sink.open_scope();
    sink.line(&format!(
        "const unsigned int lSpk = glbSpk{trg}[{off} + i];",
        trg = target.name,
        off = offset_expr
    ));

    let rl = indexing::reverse_loop(sg, source.size, target.size);
    sink.line(&format!("for (unsigned int l = 0; l < {}; l++)", rl.row_length_expr));
    sink.open_scope();
    sink.line(&format!("const unsigned int ipre = {};", rl.ipre_expr));
    let mut code = sg.weight_update.learn_post_code.clone();
    code = substitute_common(&code, sg, precision, "ipre");
    code = substitute_synapse_vars(&code, sg, rl.var_slot_expr.as_deref());
    for line in code.lines() {
        sink.line(line);
    }
    sink.close_scope();
    sink.close_scope();
    Ok(())
}

fn source_size(network: &Network, sg: &SynapseGroup) -> u32 {
    network.neuron_group(&sg.source).expect("validated").size
}

/// Compute the `(count, offset)` pair for reading a spike/event buffer,
/// honoring an optional fixed delay in steps (spec §4.5).
fn spike_source_addressing(
    group: &crate::model::NeuronGroup,
    delay_steps: Option<u32>,
    is_event: bool,
) -> (String, String) {
    let cnt_array = if is_event {
        format!("glbSpkCntEvnt{}", group.name)
    } else {
        format!("glbSpkCnt{}", group.name)
    };
    match (group.flags.delay_required, delay_steps) {
        (true, Some(steps)) => {
            let slot = delay::read_delay_slot(&group.name, group.delay_slots, steps);
            let offset = delay::read_delay_offset(&group.name, group.delay_slots, steps, group.size);
            (format!("{}[{}]", cnt_array, slot), offset)
        }
        _ => (format!("{}[0]", cnt_array), "0".to_string()),
    }
}
