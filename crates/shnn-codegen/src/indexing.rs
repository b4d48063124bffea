//! Addressing strategy across the four connectivity kinds (spec §4.4).
//!
//! Each function here returns plain expression text for the generated
//! C/C++ source; none of them touch the emission sink directly so they
//! can be unit-tested in isolation and reused by both the propagation
//! pass (forward addressing) and the post-learning pass (reverse
//! addressing).

use crate::model::{MatrixConnectivity, SynapseGroup, WeightKind};

/// How the propagation (forward) sub-pass should loop over one
/// presynaptic neuron's outgoing synapses.
pub struct ForwardLoop {
    /// Row length expression (number of iterations of the inner loop).
    pub row_length_expr: String,
    /// Expression computing `ipost` from the inner loop variable `j`
    /// (for DENSE/BITMASK, `j` *is* `ipost` and this is just `"j"`).
    pub ipost_expr: String,
    /// Index expression for per-synapse variable arrays (`{var}{group}[expr]`),
    /// given the inner loop variable `j` (and `ipre`). `None` for BITMASK
    /// (no per-synapse storage) or `WeightKind::Global` (the single
    /// shared value is substituted directly, not indexed).
    pub var_slot_expr: Option<String>,
    /// RHS of a `const uint64_t gid = (...)` declaration, only set for
    /// `MatrixConnectivity::Bitmask`. Declared after `ipost` (it reads
    /// `ipost`) and before the bitmask guard.
    pub gid_decl_expr: Option<String>,
    /// Bit-test guard expression (a `B(word, bit)` call), only set for
    /// `MatrixConnectivity::Bitmask`. References the `gid` declared from
    /// `gid_decl_expr`.
    pub bitmask_guard_expr: Option<String>,
}

/// Compute forward (propagation) addressing for `sg`, whose target
/// population has `target_size` neurons.
pub fn forward_loop(sg: &SynapseGroup, target_size: u32) -> ForwardLoop {
    match sg.connectivity {
        MatrixConnectivity::Dense => ForwardLoop {
            row_length_expr: format!("{}u", target_size),
            ipost_expr: "j".to_string(),
            var_slot_expr: slot_expr(sg, format!("ipre * {target}u + j", target = target_size)),
            gid_decl_expr: None,
            bitmask_guard_expr: None,
        },
        MatrixConnectivity::Bitmask => ForwardLoop {
            row_length_expr: format!("{}u", target_size),
            ipost_expr: "j".to_string(),
            var_slot_expr: None,
            gid_decl_expr: Some(format!("ipre * {target}ull + ipost", target = target_size)),
            bitmask_guard_expr: Some(format!("B(gp{name}[gid / 32], gid & 31)", name = sg.name)),
        },
        MatrixConnectivity::SparseYale => ForwardLoop {
            row_length_expr: format!(
                "C{name}.indInG[ipre + 1] - C{name}.indInG[ipre]",
                name = sg.name
            ),
            ipost_expr: format!("C{name}.ind[C{name}.indInG[ipre] + j]", name = sg.name),
            var_slot_expr: slot_expr(sg, format!("C{name}.indInG[ipre] + j", name = sg.name)),
            gid_decl_expr: None,
            bitmask_guard_expr: None,
        },
        MatrixConnectivity::SparseRagged => {
            let max_row = sg.max_row_connections.unwrap_or(0);
            ForwardLoop {
                row_length_expr: format!("C{name}.rowLength[ipre]", name = sg.name),
                ipost_expr: format!("C{name}.ind[ipre * {max_row}u + j]", name = sg.name, max_row = max_row),
                var_slot_expr: slot_expr(sg, format!("ipre * {max_row}u + j", max_row = max_row)),
                gid_decl_expr: None,
                bitmask_guard_expr: None,
            }
        }
    }
}

fn slot_expr(sg: &SynapseGroup, slot: impl Into<String>) -> Option<String> {
    match sg.weight_kind {
        WeightKind::Global => None,
        WeightKind::Individual => match sg.connectivity {
            MatrixConnectivity::Bitmask => None,
            _ => Some(slot.into()),
        },
    }
}

/// How the post-learning (reverse) sub-pass should loop over one
/// postsynaptic neuron's incoming synapses.
pub struct ReverseLoop {
    /// Row length expression (number of iterations of the inner loop).
    pub row_length_expr: String,
    /// Expression computing `ipre` from the inner loop variable `l`.
    pub ipre_expr: String,
    /// Index expression for per-synapse variable arrays for the same synapse.
    pub var_slot_expr: Option<String>,
}

/// Compute reverse (post-learning) addressing for `sg`, whose source
/// population has `source_size` neurons and target has `target_size`.
pub fn reverse_loop(sg: &SynapseGroup, source_size: u32, target_size: u32) -> ReverseLoop {
    match sg.connectivity {
        MatrixConnectivity::Dense => ReverseLoop {
            row_length_expr: format!("{}u", source_size),
            ipre_expr: "ipre".to_string(),
            var_slot_expr: slot_expr(sg, format!("lSpk + {target}u * ipre", target = target_size)),
        },
        MatrixConnectivity::Bitmask => ReverseLoop {
            row_length_expr: format!("{}u", source_size),
            ipre_expr: "ipre".to_string(),
            var_slot_expr: None,
        },
        MatrixConnectivity::SparseYale => {
            let slot = format!("C{name}.revIndInG[lSpk] + l", name = sg.name);
            ReverseLoop {
                row_length_expr: format!(
                    "C{name}.revIndInG[lSpk + 1] - C{name}.revIndInG[lSpk]",
                    name = sg.name
                ),
                ipre_expr: format!("C{name}.revInd[{slot}]", name = sg.name, slot = slot),
                var_slot_expr: slot_expr(sg, format!("C{name}.remap[{slot}]", name = sg.name, slot = slot)),
            }
        }
        MatrixConnectivity::SparseRagged => {
            let max_src = sg.max_source_connections.unwrap_or(0);
            let max_row = sg.max_row_connections.unwrap_or(0);
            let slot = format!("(lSpk * {max_src}u) + l", max_src = max_src);
            ReverseLoop {
                row_length_expr: format!("C{name}.colLength[lSpk]", name = sg.name),
                ipre_expr: format!(
                    "C{name}.remap[{slot}] / {max_row}u",
                    name = sg.name,
                    slot = slot,
                    max_row = max_row
                ),
                var_slot_expr: slot_expr(sg, format!("C{name}.remap[{slot}]", name = sg.name, slot = slot)),
            }
        }
    }
}
