//! Generator configuration (spec §9 "re-architecture guidance": replace
//! implicit global mutable state with an explicit, immutable config
//! value threaded through the driver).

/// Immutable knobs controlling how [`crate::driver::generate`] renders
/// its output. Constructed once per invocation and never mutated during
/// generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Emit a `// group <name>` comment before each group's block.
    pub emit_group_comments: bool,
    /// Emit the deprecated `extern "C"` linkage block GeNN-style projects
    /// historically wrapped their generated functions in.
    pub emit_extern_c: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            emit_group_comments: true,
            emit_extern_c: true,
        }
    }
}

impl GeneratorConfig {
    /// Start from defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style toggle for group comments.
    pub fn with_group_comments(mut self, enabled: bool) -> Self {
        self.emit_group_comments = enabled;
        self
    }

    /// Builder-style toggle for the `extern "C"` wrapper.
    pub fn with_extern_c(mut self, enabled: bool) -> Self {
        self.emit_extern_c = enabled;
        self
    }
}
