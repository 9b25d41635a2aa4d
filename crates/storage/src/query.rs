// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pattern translation and matching shared by the find paths.
//!
//! Caller queries are maps of `{field: pattern}` clauses, AND-combined.
//! Patterns may be plain globs (`*`, `?`) or real regexes; globs are
//! translated before compilation so `*1` means "ends in 1" rather than a
//! regex syntax error.

use regex::Regex;
use std::collections::BTreeMap;
use tracing::error;

/// Translate a caller pattern into a regex.
///
/// A pattern containing `*`/`?` and no other regex metacharacters is a
/// glob: every metacharacter is escaped, then `*` becomes `.*` and `?`
/// becomes `.`. Anything else is already a regex and passes through.
pub fn translate_pattern(input: &str) -> String {
    let has_glob = input.contains('*') || input.contains('?');
    let has_regex_meta = input
        .chars()
        .any(|c| matches!(c, '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\'));
    if !has_glob || has_regex_meta {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len() + 4);
    for c in input.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out
}

/// Substring pattern matching one `"field": "value"` pair inside a
/// JSON-serialized key column.
pub fn key_clause(field: &str, pattern: &str) -> String {
    format!(
        "\"{}\"\\s*:\\s*\"[^\"]*{}[^\"]*\"",
        regex::escape(field),
        translate_pattern(pattern),
    )
}

/// Evaluate an AND-combined clause map against a property map.
///
/// Every queried field must be present and its (translated) regex must
/// match the property's value; absent fields fail the match. A pattern
/// that fails to compile fails its clause.
pub fn props_match(props: &BTreeMap<String, String>, query: &BTreeMap<String, String>) -> bool {
    for (field, pattern) in query {
        let Some(value) = props.get(field) else {
            return false;
        };
        let translated = translate_pattern(pattern);
        match Regex::new(&translated) {
            Ok(re) => {
                if !re.is_match(value) {
                    return false;
                }
            }
            Err(e) => {
                error!(pattern = %translated, error = %e, "bad query pattern");
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
