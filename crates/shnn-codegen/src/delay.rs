//! Delay-slot arithmetic (spec §4.5).
//!
//! Every population with `delay_required` keeps a circular queue of
//! `depth` spike/state buffers, addressed through a single slot pointer
//! `spkQuePtr<group>` that advances by one slot per timestep. These
//! functions compute the byte-free, per-neuron offset into that queue for
//! the read side (axonal/back-propagation delay) and the write side
//! (this step's own slot), plus the dendritic-delay ring used by
//! per-synapse delay contributions.

/// Offset into a group's circular queue for *this* step's write, given
/// `size` neurons per slot.
pub fn write_delay_offset(group: &str, size: u32) -> String {
    format!("(spkQuePtr{g} * {n}u)", g = group, n = size)
}

/// Offset into a group's circular queue for a read `depth - delay_steps`
/// slots behind the write pointer (axonal or back-propagation delay).
///
/// `depth` is the group's total number of delay slots; `delay_steps` is
/// the fixed number of steps this particular pathway delays by.
pub fn read_delay_offset(group: &str, depth: u32, delay_steps: u32, size: u32) -> String {
    format!(
        "(((spkQuePtr{g} + {depth}u - {delay}u) % {depth}u) * {n}u)",
        g = group,
        depth = depth,
        delay = delay_steps,
        n = size
    )
}

/// Slot index (not yet multiplied by `size`) for a delayed read, used
/// where the caller needs the raw slot rather than a flattened offset
/// (e.g. to index a per-slot spike-count array).
pub fn read_delay_slot(group: &str, depth: u32, delay_steps: u32) -> String {
    format!(
        "((spkQuePtr{g} + {depth}u - {delay}u) % {depth}u)",
        g = group,
        depth = depth,
        delay = delay_steps
    )
}

/// Advance a group's slot pointer by one step, wrapping at `depth`.
pub fn advance_slot_pointer(group: &str, depth: u32) -> String {
    format!(
        "spkQuePtr{g} = (spkQuePtr{g} + 1) % {depth}u;",
        g = group,
        depth = depth
    )
}

/// Dendritic-delay ring offset: `((dendDelayPtr<syn> + d) mod maxDenDelay<syn>) * |target|`,
/// where `d` is a per-synapse runtime delay expression (already resolved
/// text, not a literal). Mirrors [`crate::stdlib::rewrite_add_to_in_syn_delay`],
/// factored out so other passes needing the same arithmetic (e.g. the
/// per-step ring-pointer advance) share one formula.
pub fn dendritic_delay_offset(synapse_group: &str, delay_steps_expr: &str, target_size: u32) -> String {
    format!(
        "(((dendDelayPtr{syn} + ({d})) % maxDenDelay{syn}) * {n}u)",
        syn = synapse_group,
        d = delay_steps_expr,
        n = target_size
    )
}

/// Advance a synapse group's dendritic-delay ring pointer by one step.
pub fn advance_dendritic_delay_pointer(synapse_group: &str) -> String {
    format!(
        "dendDelayPtr{syn} = (dendDelayPtr{syn} + 1) % maxDenDelay{syn};",
        syn = synapse_group
    )
}
