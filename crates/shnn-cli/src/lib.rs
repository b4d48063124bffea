//! hSNN CLI crate
//!
//! Purpose:
//! - Provide a CLI-first interface to the NIR compiler and code generator.
//! - Expose user-facing commands to compile, verify, and generate source from NIR programs,
//!   and list the registered op dialects.
//!
//! Public responsibilities (library view):
//! - Re-export the primary CLI entry (HsnnCli) for integration in binary and testing contexts.
//! - Expose command modules as a library so they can be invoked programmatically in tests or
//!   downstream automation if desired.
//!
//! Major commands (see [commands]):
//! - nir compile: CLI parameters → textual NIR (.nirt).
//! - nir verify: parse + `verify_module`.
//! - nir generate: parse → verify → `compile_with_passes` → `shnn_codegen::generate` → write
//!   `neuronFnct.cc`/`synapseFnct.cc` (plus `synapseDynamicsFnct.cc`/`learnPostFnct.cc` when
//!   present) to an output directory.
//! - nir op-list: dynamic registry introspection.
//!
//! Integration points:
//! - shnn_ir: parse_text/to_text for textual NIR serialization.
//! - shnn_compiler: verify_module, list_ops, compile_with_passes.
//! - shnn_codegen: GeneratorConfig, the `generate` entry point.
//!
//! Notes:
//! - The binary (src/main.rs) wires up logging and argument parsing, calling HsnnCli::execute().
//! - The library surface re-exports command modules to support integration testing without invoking
//!   an external process.

pub mod commands;
pub mod config;
pub mod error;
pub mod workspace;

pub use commands::HsnnCli;