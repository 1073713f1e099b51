//! Variable matrix expansion
//!
//! A descriptor with `vars_data: {k: [v1, v2], …}` is expanded into the
//! cartesian product of its value lists: one fully substituted descriptor
//! copy per combination. Replacement is literal text substitution over the
//! raw YAML before structural parsing, so any substitutable position —
//! including keys — is affected.

use std::collections::HashMap;

/// Expand a raw descriptor into its matrix of substituted copies.
///
/// Keys are processed in sorted order so the output sequence is
/// deterministic. With no `vars_data` the input is returned as a single
/// unchanged copy.
pub fn expand_vars_data(raw: &str, vars_data: &HashMap<String, Vec<String>>) -> Vec<String> {
    if vars_data.is_empty() {
        return vec![raw.to_string()];
    }

    let mut keys: Vec<&String> = vars_data.keys().collect();
    keys.sort();

    let mut expanded = vec![raw.to_string()];
    for key in keys {
        let needle = format!("{{{{{key}}}}}");
        expanded = expanded
            .iter()
            .flat_map(|doc| {
                vars_data[key]
                    .iter()
                    .map(|value| doc.replace(&needle, value))
                    .collect::<Vec<_>>()
            })
            .collect();
    }
    expanded
}
