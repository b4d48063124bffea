//! Token substitution primitives (spec §4.2).
//!
//! Two primitives operate on `$(...)` tokens found in a code fragment:
//!
//! - *name substitution*: `$(name)` is replaced with a fixed string for
//!   every `name` in a lookup table.
//! - *call substitution*: `$(call, a0, .., ak-1)` is replaced by a
//!   template with `$(0)..$(k-1)` bound to the (textual) call arguments.
//!
//! Both are single, deterministic, left-to-right passes over the
//! fragment. Neither recurses into its own output — composing effects
//! (e.g. a call expanding into more `$(...)` tokens) requires a further
//! pass, by design (spec §4.2 "non-recursive").
//!
//! Tokens that are not recognised by a given pass are left untouched, so
//! unresolved tokens pass through rather than silently vanishing (spec §8,
//! "no recognized token remains; unrecognized tokens are preserved").

use std::collections::BTreeMap;

use crate::error::{CodegenError, Result};

struct DollarToken {
    /// Char-index of the `$` in the token.
    start: usize,
    /// Char-index one past the closing `)`.
    end: usize,
    /// Text between the outer parens, unparsed.
    inner: String,
}

/// Scan `s` for `$( ... )` tokens, matching parens by depth so nested
/// tokens (e.g. a call argument that is itself a `$(...)` token) are
/// handled correctly. An unterminated `$(` stops the scan; everything
/// from that point on is left as plain text.
fn find_dollar_tokens(s: &str) -> Vec<DollarToken> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '$' && i + 1 < chars.len() && chars[i + 1] == '(' {
            let mut depth = 1usize;
            let mut j = i + 2;
            while j < chars.len() && depth > 0 {
                match chars[j] {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
            if depth == 0 {
                let inner: String = chars[i + 2..j].iter().collect();
                out.push(DollarToken {
                    start: i,
                    end: j + 1,
                    inner,
                });
                i = j + 1;
                continue;
            }
            break;
        }
        i += 1;
    }
    out
}

/// Split `s` on commas at paren-depth 0, trimming each part. Used to pull
/// `name, a0, a1, ...` apart from inside a dollar token without being
/// confused by parens inside an argument.
fn split_top_level_commas(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut cur = String::new();
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                cur.push(c);
            }
            ')' => {
                depth -= 1;
                cur.push(c);
            }
            ',' if depth == 0 => {
                parts.push(cur.trim().to_string());
                cur = String::new();
            }
            _ => cur.push(c),
        }
    }
    parts.push(cur.trim().to_string());
    parts
}

/// Rewrite every whole-token occurrence of `$(name)` where `name` is a
/// key of `table`, with the corresponding value. Call-shaped tokens
/// (`$(name, args...)`) and names absent from `table` pass through
/// unchanged.
pub fn substitute_names(fragment: &str, table: &BTreeMap<String, String>) -> String {
    let tokens = find_dollar_tokens(fragment);
    if tokens.is_empty() {
        return fragment.to_string();
    }
    let chars: Vec<char> = fragment.chars().collect();
    let mut out = String::new();
    let mut pos = 0usize;
    for tok in &tokens {
        out.extend(&chars[pos..tok.start]);
        let parts = split_top_level_commas(&tok.inner);
        if parts.len() == 1 {
            if let Some(repl) = table.get(parts[0].as_str()) {
                out.push_str(repl);
            } else {
                out.extend(&chars[tok.start..tok.end]);
            }
        } else {
            out.extend(&chars[tok.start..tok.end]);
        }
        pos = tok.end;
    }
    out.extend(&chars[pos..]);
    out
}

/// Rewrite every whole-token occurrence of `$(call_name, a0, .., ak-1)`
/// with `template`, after substituting `$(0)..$(k-1)` in `template` with
/// the call's argument text (itself unparsed, so an argument containing
/// further `$(...)` tokens is carried through verbatim for a later pass).
///
/// Returns [`CodegenError::CallArityMismatch`] if a token names
/// `call_name` but supplies a different number of arguments than
/// `arity`. Tokens that don't name `call_name` pass through unchanged.
pub fn substitute_call(
    fragment: &str,
    call_name: &str,
    arity: usize,
    template: &str,
) -> Result<String> {
    let tokens = find_dollar_tokens(fragment);
    if tokens.is_empty() {
        return Ok(fragment.to_string());
    }
    let chars: Vec<char> = fragment.chars().collect();
    let mut out = String::new();
    let mut pos = 0usize;
    for tok in &tokens {
        out.extend(&chars[pos..tok.start]);
        let parts = split_top_level_commas(&tok.inner);
        if parts.len() > 1 && parts[0] == call_name {
            let args = &parts[1..];
            if args.len() != arity {
                return Err(CodegenError::CallArityMismatch {
                    name: call_name.to_string(),
                    expected: arity,
                    actual: args.len(),
                });
            }
            let mut arg_table = BTreeMap::new();
            for (idx, a) in args.iter().enumerate() {
                arg_table.insert(idx.to_string(), a.clone());
            }
            out.push_str(&substitute_names(template, &arg_table));
        } else {
            out.extend(&chars[tok.start..tok.end]);
        }
        pos = tok.end;
    }
    out.extend(&chars[pos..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn name_substitution_replaces_whole_tokens_only() {
        let out = substitute_names("$(x) = $(t);", &table(&[("x", "Vmem[n]"), ("t", "t")]));
        assert_eq!(out, "Vmem[n] = t;");
    }

    #[test]
    fn name_substitution_passes_through_unknown() {
        let out = substitute_names("$(x) = $(y);", &table(&[("x", "Vmem[n]")]));
        assert_eq!(out, "Vmem[n] = $(y);");
    }

    #[test]
    fn call_substitution_binds_positional_args() {
        let out = substitute_call(
            "$(addToInSyn, $(g)*$(x_pre));",
            "addToInSyn",
            1,
            "inSyn_syn[ipost] += ($(0))",
        )
        .unwrap();
        assert_eq!(out, "inSyn_syn[ipost] += ($(g)*$(x_pre));");
    }

    #[test]
    fn call_substitution_handles_nested_tokens_in_args() {
        let out = substitute_call(
            "$(addToInSynDelay, $(g), $(d));",
            "addToInSynDelay",
            2,
            "denDelay[$(1)] += ($(0));",
        )
        .unwrap();
        assert_eq!(out, "denDelay[$(d)] += ($(g));");
    }

    #[test]
    fn call_substitution_arity_mismatch_errors() {
        let err = substitute_call("$(addToInSyn, $(g), $(x));", "addToInSyn", 1, "X").unwrap_err();
        assert!(matches!(err, CodegenError::CallArityMismatch { .. }));
    }

    #[test]
    fn passes_have_no_effect_on_unterminated_token() {
        let out = substitute_names("prefix $(oops", &table(&[("oops", "nope")]));
        assert_eq!(out, "prefix $(oops");
    }
}
