//! The emission sink: an append-only text buffer with scoped block
//! bracketing (spec §4.1).
//!
//! Scopes nest and must balance; a mismatch is a programming error in the
//! emitter (spec §7), so it is upheld with `assert!`/`debug_assert!`
//! rather than threaded through a `Result`.

/// Append-only text buffer with `{`/`}` scope tracking and labelled
/// brackets for guards whose open and close sites are textually far
/// apart (spec §4.1, §9 "labelled-bracket mechanism").
#[derive(Debug, Default)]
pub struct EmissionSink {
    buf: String,
    indent: usize,
    /// `None` for a plain scope, `Some(tag)` for a labelled bracket.
    scope_stack: Vec<Option<i64>>,
}

const INDENT_WIDTH: usize = 4;

impl EmissionSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw text at the current indent, without a trailing newline.
    pub fn append(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Append a line at the current indent, with a trailing newline.
    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            self.buf.push_str(&" ".repeat(self.indent * INDENT_WIDTH));
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    /// Append raw text verbatim (no indent, no trailing newline) — used
    /// for include guards and other top-level boilerplate.
    pub fn raw(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Open an unlabelled `{` scope and increase indent.
    pub fn open_scope(&mut self) {
        self.line("{");
        self.indent += 1;
        self.scope_stack.push(None);
    }

    /// Close the innermost unlabelled scope.
    ///
    /// # Panics
    /// Panics if the innermost open scope is labelled, or if no scope is
    /// open — both indicate a bug in the emitter, not a user error.
    pub fn close_scope(&mut self) {
        match self.scope_stack.pop() {
            Some(None) => {
                self.indent -= 1;
                self.line("}");
            }
            Some(Some(tag)) => panic!(
                "emitter bug: close_scope() called but innermost open scope is labelled bracket {}",
                tag
            ),
            None => panic!("emitter bug: close_scope() called with no open scope"),
        }
    }

    /// Open a `{` scope tagged with an integer id, for guards whose close
    /// site is emitted far away in the same pass.
    pub fn open_labelled(&mut self, tag: i64) {
        self.line("{");
        self.indent += 1;
        self.scope_stack.push(Some(tag));
    }

    /// Close the labelled bracket with the matching tag.
    ///
    /// # Panics
    /// Panics if the innermost open scope is not labelled with exactly
    /// this tag — a mismatch is a programming error (spec §4.1).
    pub fn close_labelled(&mut self, tag: i64) {
        match self.scope_stack.pop() {
            Some(Some(found)) if found == tag => {
                self.indent -= 1;
                self.line("}");
            }
            Some(Some(found)) => panic!(
                "emitter bug: close_labelled({}) called but innermost labelled bracket is {}",
                tag, found
            ),
            Some(None) => panic!(
                "emitter bug: close_labelled({}) called but innermost open scope is unlabelled",
                tag
            ),
            None => panic!("emitter bug: close_labelled({}) called with no open scope", tag),
        }
    }

    /// Number of scopes (labelled or not) still open.
    pub fn open_scope_count(&self) -> usize {
        self.scope_stack.len()
    }

    /// Finish emission and return the buffered text.
    ///
    /// # Panics
    /// Panics if any scope is still open — the emitter must balance all
    /// scopes before finishing a pass (spec §8 invariant 1).
    pub fn finish(self) -> String {
        assert!(
            self.scope_stack.is_empty(),
            "emitter bug: {} scope(s) still open at finish()",
            self.scope_stack.len()
        );
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_scopes_finish_cleanly() {
        let mut sink = EmissionSink::new();
        sink.line("void f()");
        sink.open_scope();
        sink.line("int x = 0;");
        sink.open_scope();
        sink.line("x++;");
        sink.close_scope();
        sink.close_scope();
        let text = sink.finish();
        assert_eq!(text.matches('{').count(), text.matches('}').count());
    }

    #[test]
    fn labelled_brackets_pair_by_tag() {
        let mut sink = EmissionSink::new();
        sink.open_scope();
        sink.open_labelled(2041);
        sink.line("do_thing();");
        sink.close_labelled(2041);
        sink.close_scope();
        let text = sink.finish();
        assert_eq!(text.matches('{').count(), 2);
        assert_eq!(text.matches('}').count(), 2);
    }

    #[test]
    #[should_panic(expected = "still open")]
    fn unbalanced_scope_panics_on_finish() {
        let mut sink = EmissionSink::new();
        sink.open_scope();
        let _ = sink.finish();
    }

    #[test]
    #[should_panic(expected = "labelled bracket")]
    fn mismatched_label_panics() {
        let mut sink = EmissionSink::new();
        sink.open_labelled(1);
        sink.close_labelled(2);
    }
}
