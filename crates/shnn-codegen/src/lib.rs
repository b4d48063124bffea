//! Simulation-step code generator for spiking neural networks.
//!
//! Given a resolved [`model::Network`] — the typed IR produced by a
//! frontend such as `shnn-compiler` — this crate lowers it into the four
//! C/C++ translation units a CPU backend needs to step the simulation
//! forward: neuron state update, synapse dynamics, spike/event
//! propagation, and post-synaptic learning. It does not execute
//! anything; the output is source text, handed back to the caller to
//! write to disk or feed to a compiler.
//!
//! Entry point: [`driver::generate`].

pub mod config;
pub mod delay;
pub mod driver;
pub mod error;
pub mod indexing;
pub mod model;
pub mod neuron_pass;
pub mod sink;
pub mod stdlib;
pub mod subst;
pub mod synapse_pass;

pub use config::GeneratorConfig;
pub use driver::{generate, GeneratedSources};
pub use error::{CodegenError, Result};
pub use model::Network;
