//! The standard substitution library (spec §4.3): the fixed composition
//! of name and call substitutions ([`crate::subst`]) applied to every
//! model fragment, regardless of which pass emits it.
//!
//! Each function here wraps one or more [`crate::subst`] primitives with
//! the naming convention the rest of the generator relies on (array
//! names, accumulator names, namespacing). None of them know about
//! indexing or delay arithmetic directly — those are supplied by the
//! caller (`neuron_pass`/`synapse_pass`) as plain strings, keeping this
//! module a pure text-rewriting layer.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::{DerivedParam, Precision, VarInit};
use crate::subst::{substitute_call, substitute_names};

fn table(pairs: impl IntoIterator<Item = (String, String)>) -> BTreeMap<String, String> {
    pairs.into_iter().collect()
}

/// `$(t)` -> the current simulation time variable.
pub fn substitute_time(fragment: &str, time_var: &str) -> String {
    substitute_names(fragment, &table([("t".to_string(), time_var.to_string())]))
}

/// `$(id)` -> the per-thread index expression (`n`/`ipre`/`ipost` depending on pass).
pub fn substitute_id(fragment: &str, id_expr: &str) -> String {
    substitute_names(fragment, &table([("id".to_string(), id_expr.to_string())]))
}

/// `$(dt)` -> the simulation timestep, as a precision-correct literal.
pub fn substitute_dt(fragment: &str, dt: f64, precision: Precision) -> String {
    substitute_names(fragment, &table([("dt".to_string(), precision.literal(dt))]))
}

/// Substitute fixed and derived parameter names with their literal values.
pub fn substitute_params(fragment: &str, params: &[DerivedParam], precision: Precision) -> String {
    let t = table(params.iter().map(|p| (p.name.clone(), precision.literal(p.value))));
    substitute_names(fragment, &t)
}

/// Substitute state-variable names with their addressed storage expression.
///
/// `addr_of` maps a variable name to the expression that reads/writes its
/// storage for the current pass (e.g. `V<grp>[n]` vs `V<grp>[offset + n]`
/// under a delay queue); variables not covered by `addr_of` are looked up
/// directly by name in `vars` and otherwise left untouched.
pub fn substitute_vars(
    fragment: &str,
    vars: &[VarInit],
    addr_of: impl Fn(&str) -> Option<String>,
) -> String {
    let t = table(vars.iter().filter_map(|v| addr_of(&v.name).map(|a| (v.name.clone(), a))));
    substitute_names(fragment, &t)
}

/// Substitute extra-global-parameter names with their top-level array reference.
pub fn substitute_egps(fragment: &str, egp_names: &[String], group: &str) -> String {
    let t = table(egp_names.iter().map(|n| (n.clone(), format!("{}{}", n, group))));
    substitute_names(fragment, &t)
}

/// Qualify declared support-code function names with their namespace,
/// e.g. `foo` -> `MyGroup_neuron::foo` when `namespace == "MyGroup_neuron"`.
pub fn substitute_support_code(fragment: &str, names: &[String], namespace: &str) -> String {
    if namespace.is_empty() || names.is_empty() {
        return fragment.to_string();
    }
    let t = table(names.iter().map(|n| (n.clone(), format!("{}::{}", namespace, n))));
    substitute_names(fragment, &t)
}

/// Poisson input rewrite: `$(lrate)` -> the group's input-rate array read
/// at the current delay offset (spec §4.6.e).
pub fn substitute_lrate(fragment: &str, group: &str, offset_expr: &str) -> String {
    let t = table([(
        "lrate".to_string(),
        format!("rates{}[n + {}]", group, offset_expr),
    )]);
    substitute_names(fragment, &t)
}

/// `$(addToInSyn, x)` -> accumulate `x` directly into the non-delayed
/// input-current accumulator for `psm_target`.
pub fn rewrite_add_to_in_syn(fragment: &str, psm_target: &str) -> Result<String> {
    // No trailing `;` here: the call token is followed by the user
    // fragment's own `;`, which substitute_call leaves in place untouched.
    let template = format!("inSyn{psm}[ipost] += ($(0))", psm = psm_target);
    substitute_call(fragment, "addToInSyn", 1, &template)
}

/// `$(addToInSynDelay, x, d)` -> accumulate `x` into the dendritic-delay
/// ring buffer for `psm_target`, `d` steps in the future (spec §4.5
/// "dendritic delay").
pub fn rewrite_add_to_in_syn_delay(
    fragment: &str,
    synapse_group: &str,
    psm_target: &str,
    target_size: u32,
) -> Result<String> {
    let offset = format!(
        "(((dendDelayPtr{syn} + ($(1))) % maxDenDelay{syn}) * {size}u)",
        syn = synapse_group,
        size = target_size
    );
    let template = format!("denDelay{psm}[{offset} + ipost] += ($(0))", psm = psm_target, offset = offset);
    substitute_call(fragment, "addToInSynDelay", 2, &template)
}

/// Whether a raw (pre-substitution) fragment uses the deprecated
/// `$(updatelinsyn)`/`$(addtoinSyn)` aliases, which only apply on the
/// non-dendritic-delay path and require a local `linSyn` scalar.
pub fn references_deprecated_linsyn(code: &str) -> bool {
    code.contains("$(updatelinsyn)") || code.contains("$(addtoinSyn)")
}

/// Expand `$(updatelinsyn)` into the two tokens it has always stood for,
/// preserved verbatim for backward compatibility (spec §4.3 "deprecated
/// aliases"). Must run before [`resolve_in_syn_aliases`] so the tokens it
/// produces get resolved in the same pass sequence.
pub fn expand_updatelinsyn(fragment: &str) -> String {
    let t = table([(
        "updatelinsyn".to_string(),
        "$(inSyn) += $(addtoinSyn);".to_string(),
    )]);
    substitute_names(fragment, &t)
}

/// Resolve `$(inSyn)`/`$(addtoinSyn)` to the non-delayed accumulator and
/// the local scalar a synapse updates before calling `$(updatelinsyn)`.
/// Only valid on the non-dendritic-delay path.
pub fn resolve_in_syn_aliases(fragment: &str, psm_target: &str) -> String {
    let t = table([
        ("inSyn".to_string(), format!("inSyn{}[ipost]", psm_target)),
        ("addtoinSyn".to_string(), "linSyn".to_string()),
    ]);
    substitute_names(fragment, &t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_in_syn_rewrites_accumulator() {
        let out = rewrite_add_to_in_syn("$(addToInSyn, $(g)*$(x_pre));", "syn").unwrap();
        assert_eq!(out, "inSynsyn[ipost] += ($(g)*$(x_pre));");
    }

    #[test]
    fn add_to_in_syn_delay_binds_offset_and_value() {
        let out =
            rewrite_add_to_in_syn_delay("$(addToInSynDelay, $(g), $(d));", "syn", "syn", 10).unwrap();
        assert!(out.contains("denDelaysyn["));
        assert!(out.contains("maxDenDelaysyn"));
        assert!(out.contains("$(g)"));
        assert!(out.contains("$(d)"));
    }

    #[test]
    fn deprecated_aliases_compose_across_two_passes() {
        let raw = "$(addtoinSyn) = $(g); $(updatelinsyn)";
        assert!(references_deprecated_linsyn(raw));
        let expanded = expand_updatelinsyn(raw);
        let resolved = resolve_in_syn_aliases(&expanded, "syn");
        assert_eq!(resolved, "linSyn = $(g); inSynsyn[ipost] += linSyn;");
    }

    #[test]
    fn support_code_names_are_namespaced() {
        let out = substitute_support_code("y = $(myFunc)(x);", &["myFunc".to_string()], "Pop_neuron");
        assert_eq!(out, "y = Pop_neuron::myFunc(x);");
    }
}
