//! Template substitution for descriptor fields
//!
//! Handles `{{name}}` substitution across endpoint URLs, key lists,
//! parameter bags, and documentation, plus the `{{time:…}}` token shape
//! that resolves to Unix-second timestamps at request-build time.

use crate::error::{Error, Result};
use crate::types::{MultiMap, RuntimeParams, StringMap};
use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

/// Matches a whole querystring value of the form `{{time:DUR}}`
static TIME_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{time:(-?.+)\}\}$").unwrap());

/// Compose the substitution map for one endpoint.
///
/// Later writers win: root `vars` first, then endpoint `vars`, then root
/// `global_vars`. The flag reports whether any endpoint-level source was
/// nonempty — when false, no substitution pass runs at all.
pub fn merge_vars(
    root_vars: &StringMap,
    endpoint_vars: &StringMap,
    global_vars: &StringMap,
) -> (StringMap, bool) {
    let mut vars = root_vars.clone();
    let mut substitute = false;
    if !endpoint_vars.is_empty() {
        substitute = true;
        for (k, v) in endpoint_vars {
            vars.insert(k.clone(), v.clone());
        }
    }
    if !global_vars.is_empty() {
        substitute = true;
        for (k, v) in global_vars {
            vars.insert(k.clone(), v.clone());
        }
    }
    (vars, substitute)
}

/// Replace every `{{key}}` occurrence in `text` with `value`.
pub fn replace_var(text: &str, key: &str, value: &str) -> String {
    text.replace(&format!("{{{{{key}}}}}"), value)
}

/// Replace every `{{key}}` occurrence for every binding in `vars`.
pub fn substitute(text: &str, vars: &StringMap) -> String {
    let mut result = text.to_string();
    for (key, value) in vars {
        result = replace_var(&result, key, value);
    }
    result
}

/// Apply the explicit runtime override channel to a URL.
///
/// For each entry under `runtime_params["*"]["var_params"]` whose
/// lowercased name equals the substitution key, occurrences of the
/// uppercased key in the URL are replaced by the override value. This is
/// distinct from the `{{key}}` mechanism: it rewrites bare uppercase
/// markers left in the URL after ordinary substitution.
pub fn apply_var_params(url: &str, key: &str, runtime_params: &RuntimeParams) -> String {
    let Some(var_params) = runtime_params.get("*").and_then(|m| m.get("var_params")) else {
        return url.to_string();
    };
    let mut result = url.to_string();
    for (var_key, var_value) in var_params {
        if var_key.to_lowercase() == key.to_lowercase() {
            result = result.replace(&key.to_uppercase(), var_value);
        }
    }
    result
}

/// Expand `{{time:…}}` tokens in every querystring value.
///
/// `{{time:now}}` resolves to the current Unix second; any other payload
/// must parse as a signed duration and resolves to `now + dur`. A value
/// that mentions `{{time:` but doesn't match the token shape is a fatal
/// configuration error. Values with ordinary `{{…}}` templates are left
/// for the substitution pass.
pub fn expand_time_tokens(querystring: &mut MultiMap) -> Result<()> {
    for values in querystring.values_mut() {
        for value in values.iter_mut() {
            if !value.contains("{{") || !value.contains("{{time:") {
                continue;
            }
            let captured = TIME_TOKEN_REGEX
                .captures(value)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Error::time_token(value.clone(), "unrecognized token shape"))?;

            let now = Utc::now().timestamp();
            let resolved = if captured == "now" {
                now
            } else {
                now + parse_signed_duration(&captured)
                    .map_err(|e| Error::time_token(value.clone(), e))?
            };
            *value = resolved.to_string();
        }
    }
    Ok(())
}

/// Parse a possibly negative duration string into whole seconds.
fn parse_signed_duration(input: &str) -> std::result::Result<i64, String> {
    let (negative, body) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let duration = humantime::parse_duration(body).map_err(|e| e.to_string())?;
    let seconds = i64::try_from(duration.as_secs()).map_err(|e| e.to_string())?;
    Ok(if negative { -seconds } else { seconds })
}
