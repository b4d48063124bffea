//! The neuron pass emitter (spec §4.6): lowers one [`NeuronGroup`] into
//! the body of `calcNeuronsCPU`.
//!
//! Per neuron, in order:
//! (a) load local copies of state variables, (b) sum postsynaptic input
//! into `Isyn`, (c) if auto-refractory, snapshot the threshold as
//! `oldSpike` *before* `simCode` runs, then run `simCode`, (d) test the
//! true-spike threshold (combined with `&& !oldSpike` when auto-refractory
//! is on) and react, (e) test the spike-like-event threshold and react,
//! (f) write local copies back to storage. Groups with `flags.delay_required`
//! also declare `readDelayOffset`/`writeDelayOffset` before the loop and
//! advance their spike-queue pointer once per group, after the per-neuron
//! loop closes.
//!
//! State variables themselves are *not* delayed — only the spike buffers
//! downstream synapse groups read from past steps are. A group with
//! `!flags.delay_required` therefore takes the flat `[n]` addressing path
//! with no `spkQuePtr`/offset arithmetic at all (spec §9 "re-architecture
//! guidance": don't pay delay-queue overhead where no synapse group uses
//! axonal or back-propagation delay).

use crate::delay;
use crate::model::{NeuronGroup, Precision};
use crate::sink::EmissionSink;
use crate::stdlib;

/// Emit the full update loop for `group` into `sink`.
pub fn emit_neuron_group(
    sink: &mut EmissionSink,
    group: &NeuronGroup,
    dt: f64,
    precision: Precision,
    group_comments: bool,
) {
    if group_comments {
        sink.line(&format!("// neuron group {}", group.name));
    }

    if group.flags.delay_required {
        sink.line(&format!(
            "unsigned int readDelayOffset{g} = {off};",
            g = group.name,
            off = delay::read_delay_offset(&group.name, group.delay_slots, 1, group.size)
        ));
        sink.line(&format!(
            "unsigned int writeDelayOffset{g} = {off};",
            g = group.name,
            off = delay::write_delay_offset(&group.name, group.size)
        ));
        sink.line(&format!(
            "glbSpkCnt{g}[spkQuePtr{g}] = 0;",
            g = group.name
        ));
        if group.flags.spike_event_required {
            sink.line(&format!("glbSpkCntEvnt{g}[spkQuePtr{g}] = 0;", g = group.name));
        }
    } else {
        sink.line(&format!("glbSpkCnt{g}[0] = 0;", g = group.name));
        if group.flags.spike_event_required {
            sink.line(&format!("glbSpkCntEvnt{g}[0] = 0;", g = group.name));
        }
    }

    sink.line(&format!(
        "for (unsigned int n = 0; n < {size}u; n++)",
        size = group.size
    ));
    sink.open_scope();

    // (a) load local copies of state variables
    for v in &group.model.var_names {
        sink.line(&format!(
            "{ty} l{name} = {name}{grp}[n];",
            ty = precision.scalar_type(),
            name = v.name,
            grp = group.name
        ));
    }

    // (b) sum postsynaptic input into Isyn
    sink.line(&format!("{} Isyn = 0;", precision.scalar_type()));
    for merged in &group.merged_in_syns {
        emit_merged_in_syn(sink, merged, group.size, precision);
    }

    // (c) snapshot oldSpike before simCode runs (auto-refractory only), then run simCode
    if group.flags.true_spike_required
        && group.flags.auto_refractory_enabled
        && !group.model.threshold_condition_code.trim().is_empty()
    {
        let cond = resolve_threshold(&group.model.threshold_condition_code, group, precision, dt);
        sink.line(&format!("const bool oldSpike = ({});", cond));
    }

    let mut sim = group.model.sim_code.clone();
    sim = stdlib::substitute_time(&sim, "t");
    sim = stdlib::substitute_dt(&sim, dt, precision);
    sim = stdlib::substitute_params(&sim, &group.model.param_names, precision);
    sim = stdlib::substitute_params(&sim, &group.model.derived_param_names, precision);
    sim = stdlib::substitute_egps(&sim, &group.model.extra_global_param_names, &group.name);
    sim = stdlib::substitute_support_code(
        &sim,
        &group.model.support_code_names,
        &group.model.support_code_namespace,
    );
    sim = stdlib::substitute_id(&sim, "n");
    sim = substitute_local_vars(&sim, group);
    if group.flags.is_poisson {
        let offset = if group.flags.delay_required {
            delay::read_delay_slot(&group.name, group.delay_slots, 1)
        } else {
            "0".to_string()
        };
        sim = stdlib::substitute_lrate(&sim, &group.name, &offset);
    }
    for line in sim.lines() {
        sink.line(line);
    }

    // (d) true-spike threshold
    if group.flags.true_spike_required && group.model.threshold_condition_code.trim().is_empty() {
        log::warn!(
            "neuron group '{}' has true_spike_required set but no threshold_condition_code; omitting spike detection",
            group.name
        );
    }
    if group.flags.true_spike_required && !group.model.threshold_condition_code.trim().is_empty() {
        let cond = resolve_threshold(&group.model.threshold_condition_code, group, precision, dt);
        // The threshold expression is deliberately evaluated twice: once
        // before simCode to snapshot `oldSpike`, once here (post-simCode)
        // combined with `&& !oldSpike` so a neuron already spiking last
        // step's threshold doesn't spike again before its refractory reset
        // has had a chance to take effect.
        let guarded = if group.flags.auto_refractory_enabled {
            format!("(({}) && !oldSpike)", cond)
        } else {
            format!("({})", cond)
        };
        sink.line(&format!("if {}", guarded));
        sink.open_scope();
        let spike_idx = if group.flags.delay_required {
            format!(
                "glbSpk{g}[writeDelayOffset{g} + (glbSpkCnt{g}[spkQuePtr{g}]++)]",
                g = group.name
            )
        } else {
            format!("glbSpk{g}[glbSpkCnt{g}[0]++]", g = group.name)
        };
        sink.line(&format!("{} = n;", spike_idx));
        if group.flags.spike_time_required {
            let t_idx = if group.flags.delay_required {
                format!("sT{g}[writeDelayOffset{g} + n]", g = group.name)
            } else {
                format!("sT{g}[n]", g = group.name)
            };
            sink.line(&format!("{} = t;", t_idx));
        }
        if !group.model.reset_code.trim().is_empty() {
            let mut reset = group.model.reset_code.clone();
            reset = stdlib::substitute_time(&reset, "t");
            reset = stdlib::substitute_params(&reset, &group.model.param_names, precision);
            reset = stdlib::substitute_params(&reset, &group.model.derived_param_names, precision);
            reset = substitute_local_vars(&reset, group);
            for line in reset.lines() {
                sink.line(line);
            }
        }
        sink.close_scope();
    }

    // (e) spike-like-event threshold
    if group.flags.spike_event_required && !group.model.event_threshold_code.trim().is_empty() {
        let mut cond = group.model.event_threshold_code.clone();
        cond = stdlib::substitute_time(&cond, "t");
        cond = stdlib::substitute_params(&cond, &group.model.param_names, precision);
        cond = stdlib::substitute_params(&cond, &group.model.derived_param_names, precision);
        cond = substitute_local_vars(&cond, group);
        sink.line(&format!("if ({})", cond));
        sink.open_scope();
        let event_idx = if group.flags.delay_required {
            format!(
                "glbSpkEvnt{g}[writeDelayOffset{g} + (glbSpkCntEvnt{g}[spkQuePtr{g}]++)]",
                g = group.name
            )
        } else {
            format!("glbSpkEvnt{g}[glbSpkCntEvnt{g}[0]++]", g = group.name)
        };
        sink.line(&format!("{} = n;", event_idx));
        if !group.model.event_code.trim().is_empty() {
            let mut ev = group.model.event_code.clone();
            ev = stdlib::substitute_time(&ev, "t");
            ev = substitute_local_vars(&ev, group);
            for line in ev.lines() {
                sink.line(line);
            }
        }
        sink.close_scope();
    }

    // (f) write local copies back to storage
    for v in &group.model.var_names {
        sink.line(&format!("{name}{grp}[n] = l{name};", name = v.name, grp = group.name));
    }

    sink.close_scope();

    if group.flags.delay_required {
        sink.line(&delay::advance_slot_pointer(&group.name, group.delay_slots));
    }
}

fn resolve_threshold(code: &str, group: &NeuronGroup, precision: Precision, _dt: f64) -> String {
    let mut cond = code.to_string();
    cond = stdlib::substitute_time(&cond, "t");
    cond = stdlib::substitute_params(&cond, &group.model.param_names, precision);
    cond = stdlib::substitute_params(&cond, &group.model.derived_param_names, precision);
    substitute_local_vars(&cond, group)
}

fn substitute_local_vars(fragment: &str, group: &NeuronGroup) -> String {
    stdlib::substitute_vars(fragment, &group.model.var_names, |name| {
        group
            .model
            .var_names
            .iter()
            .find(|v| v.name == name)
            .map(|v| format!("l{}", v.name))
    })
}

fn emit_merged_in_syn(
    sink: &mut EmissionSink,
    merged: &crate::model::MergedInSyn,
    target_size: u32,
    precision: Precision,
) {
    if merged.dendritic_delay_required {
        // Drain the front slot of this merge point's dendritic-delay ring,
        // keyed by the same `dendDelayPtr<psm>`/`maxDenDelay<psm>` pair the
        // contributing synapse groups write into (see
        // `stdlib::rewrite_add_to_in_syn_delay`).
        let front = delay::dendritic_delay_offset(&merged.psm_target, "0", target_size);
        sink.line(&format!("Isyn += denDelay{psm}[{off} + n];", psm = merged.psm_target, off = front));
        sink.line(&format!("denDelay{psm}[{off} + n] = 0;", psm = merged.psm_target, off = front));
        sink.line(&delay::advance_dendritic_delay_pointer(&merged.psm_target));
    }

    let mut apply = merged.post_syn_model.apply_input_code.clone();
    if apply.trim().is_empty() {
        apply = "$(Isyn) += $(inSyn);".to_string();
    }
    apply = apply.replace("$(inSyn)", &format!("inSyn{}[n]", merged.psm_target));
    apply = apply.replace("$(Isyn)", "Isyn");
    for line in apply.lines() {
        sink.line(line);
    }

    if !merged.post_syn_model.decay_code.trim().is_empty() {
        let mut decay = merged.post_syn_model.decay_code.clone();
        decay = decay.replace("$(inSyn)", &format!("inSyn{}[n]", merged.psm_target));
        decay = stdlib::substitute_dt(&decay, 0.0, precision);
        for line in decay.lines() {
            sink.line(line);
        }
    }
}
