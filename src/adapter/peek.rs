//! Default paging peek implementations
//!
//! A peek inspects a response payload and decides whether another page
//! exists and, if so, what indicator to send next. Three built-in flavors
//! cover the common shapes: a plain drill-down peek, a regex peek for
//! indicators embedded in strings (e.g. Link headers), and a calculated
//! peek for page-number/per-page/total-count arithmetic.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use regex::Regex;
use tracing::warn;

/// Drill into a parsed payload by successive keys.
fn drill<'a>(payload: &'a JsonValue, keys: &[String]) -> Option<&'a JsonValue> {
    let mut current = payload;
    for key in keys {
        current = current.get(key)?;
    }
    if keys.is_empty() {
        None
    } else {
        Some(current)
    }
}

/// Parse a peek payload into a JSON object.
///
/// A top-level list is a pageless response; anything unparseable is a
/// decode error.
fn parse_object(payload: &[u8]) -> Result<Option<JsonValue>> {
    match serde_json::from_slice::<JsonValue>(payload) {
        Ok(value @ JsonValue::Object(_)) => Ok(Some(value)),
        Ok(JsonValue::Array(_)) => {
            warn!("Peek payload is a list - no paging");
            Ok(None)
        }
        Ok(_) => Ok(None),
        Err(e) => Err(Error::decode(format!(
            "Unable to parse peek payload ({}): {e}",
            String::from_utf8_lossy(&payload[..payload.len().min(120)])
        ))),
    }
}

/// Plain JSON peek: drill down `response_keys`, stop at a fixed point.
///
/// Returns the value found at the key path and whether it signals another
/// page. A value equal to `old_page_value` means the API reached a fixed
/// point and paging stops.
pub fn default_json_peek(
    payload: &[u8],
    response_keys: &[String],
    old_page_value: Option<&JsonValue>,
    _peek_params: &[String],
) -> Result<(Option<JsonValue>, bool)> {
    if payload.len() < 4 {
        return Ok((None, false));
    }
    let Some(parsed) = parse_object(payload)? else {
        return Ok((None, false));
    };

    let mut page_value = drill(&parsed, response_keys).cloned();
    if let (Some(new), Some(old)) = (&page_value, old_page_value) {
        if new == old {
            page_value = None;
        }
    }

    let more = match &page_value {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    let page_value = if more { page_value } else { None };
    Ok((page_value, more))
}

/// Regex peek: drill like the plain peek, then pull the indicator out of
/// the matched string with the first capture group of `peek_params[0]`.
///
/// When the drilled value is a list of strings, the first element with a
/// capture wins.
pub fn regex_json_peek(
    payload: &[u8],
    response_keys: &[String],
    old_page_value: Option<&JsonValue>,
    peek_params: &[String],
) -> Result<(Option<JsonValue>, bool)> {
    let pattern = peek_params
        .first()
        .ok_or_else(|| Error::paging("Regex peek requires a pattern parameter"))?;
    let re = Regex::new(pattern)
        .map_err(|e| Error::paging(format!("Invalid peek regex '{pattern}': {e}")))?;

    let (value, present) = default_json_peek(payload, response_keys, old_page_value, peek_params)?;
    if !present {
        return Ok((None, false));
    }

    let capture_from = |text: &str| -> Option<JsonValue> {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| JsonValue::String(m.as_str().to_string()))
    };

    match value {
        Some(JsonValue::Array(items)) => {
            for item in items {
                if let JsonValue::String(text) = item {
                    if let Some(captured) = capture_from(&text) {
                        return Ok((Some(captured), true));
                    }
                }
            }
            Ok((None, false))
        }
        Some(JsonValue::String(text)) => match capture_from(&text) {
            Some(captured) => Ok((Some(captured), true)),
            None => Ok((None, false)),
        },
        _ => Ok((None, false)),
    }
}

/// Calculated peek: derive the next page number from current page,
/// per-page size, and total count.
///
/// `response_keys[0]` is a `"Lp,Lpp"` header recording the segment counts
/// of the page-number and per-page key paths; the remaining entries are
/// the three paths' segments concatenated in order.
pub fn calculated_json_peek(
    payload: &[u8],
    response_keys: &[String],
    _old_page_value: Option<&JsonValue>,
    _peek_params: &[String],
) -> Result<(Option<JsonValue>, bool)> {
    if response_keys.len() < 4 {
        return Err(Error::paging(
            "Unable to calculate paging without at least three keys",
        ));
    }
    let lengths: Vec<&str> = response_keys[0].split(',').collect();
    if lengths.len() != 2 {
        return Err(Error::paging("Invalid length keys for paging calculation"));
    }
    let page_len: usize = lengths[0]
        .parse()
        .map_err(|_| Error::paging("Non integer length keys for paging calculation"))?;
    let per_page_len: usize = lengths[1]
        .parse()
        .map_err(|_| Error::paging("Non integer length keys for paging calculation"))?;

    let keys = &response_keys[1..];
    if keys.len() < page_len + per_page_len {
        return Err(Error::paging("Invalid length keys for paging calculation"));
    }

    let Some(parsed) = parse_object(payload)? else {
        return Ok((None, false));
    };

    let page = drill(&parsed, &keys[..page_len]).and_then(JsonValue::as_f64);
    let per_page = drill(&parsed, &keys[page_len..page_len + per_page_len]).and_then(JsonValue::as_f64);
    let total = drill(&parsed, &keys[page_len + per_page_len..]).and_then(JsonValue::as_f64);

    let (Some(page), Some(per_page), Some(total)) = (page, per_page, total) else {
        return Ok((None, false));
    };
    if total <= per_page {
        return Ok((None, false));
    }
    if page * per_page < total {
        let next = serde_json::Number::from_f64(page + 1.0)
            .map(JsonValue::Number)
            .ok_or_else(|| Error::paging("Calculated page number is not finite"))?;
        Ok((Some(next), true))
    } else {
        Ok((None, false))
    }
}
