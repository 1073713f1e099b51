//! XML to JSON normalization
//!
//! Converts simple XML response bodies into the JSON form the rest of the
//! pipeline works with, and scrubs the repeating wrapper tags XML schemas
//! tend to put around list items.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};

/// Convert an XML document into a JSON value.
///
/// Handles element nesting, repeated sibling elements (collected into
/// lists), self-closing tags, and scalar text content. Attributes are not
/// carried over.
pub fn xml_to_json(xml: &str) -> Result<JsonValue> {
    let xml = xml.trim();
    if !xml.starts_with('<') {
        return Err(Error::XmlParse {
            message: "Input does not appear to be XML".to_string(),
        });
    }
    parse_element(xml).map(|(value, _)| value)
}

/// Parse one XML element, returning its JSON value and the remaining input.
fn parse_element(input: &str) -> Result<(JsonValue, &str)> {
    let input = input.trim();

    if !input.starts_with('<') {
        if let Some(pos) = input.find('<') {
            let text = input[..pos].trim();
            if text.is_empty() {
                return parse_element(&input[pos..]);
            }
            return Ok((parse_text_value(text), &input[pos..]));
        }
        return Ok((parse_text_value(input.trim()), ""));
    }

    // Skip the XML declaration
    if input.starts_with("<?") {
        if let Some(end) = input.find("?>") {
            return parse_element(&input[end + 2..]);
        }
    }

    let tag_end = input[1..].find(['>', ' ', '/']).ok_or_else(|| Error::XmlParse {
        message: "Malformed tag".to_string(),
    })?;
    let tag_name = &input[1..=tag_end];

    // Self-closing tag
    let open_end = input.find('>').ok_or_else(|| Error::XmlParse {
        message: "Malformed tag".to_string(),
    })?;
    if input[..=open_end].ends_with("/>") {
        return Ok((JsonValue::Null, &input[open_end + 1..]));
    }

    let close_tag = format!("</{tag_name}>");
    let close_pos = input.find(&close_tag).ok_or_else(|| Error::XmlParse {
        message: format!("Missing closing tag for {tag_name}"),
    })?;
    let content = &input[open_end + 1..close_pos];
    let remaining = &input[close_pos + close_tag.len()..];

    if content.trim().is_empty() {
        return Ok((JsonValue::Null, remaining));
    }

    if content.contains('<') {
        let mut obj = JsonObject::new();
        let mut current = content.trim();

        while !current.is_empty() && current.contains('<') {
            if !current.starts_with('<') {
                match current.find('<') {
                    Some(pos) => current = &current[pos..],
                    None => break,
                }
            }
            let Some(child_tag_end) = current[1..].find(['>', ' ', '/']) else {
                break;
            };
            let child_tag = current[1..=child_tag_end].to_string();
            if child_tag.starts_with('/') {
                break;
            }

            let (child_value, rest) = parse_element(current)?;

            // Repeated siblings with the same name become a list
            if let Some(existing) = obj.get_mut(&child_tag) {
                if let JsonValue::Array(items) = existing {
                    items.push(child_value);
                } else {
                    let items = vec![existing.clone(), child_value];
                    obj.insert(child_tag, JsonValue::Array(items));
                }
            } else {
                obj.insert(child_tag, child_value);
            }

            current = rest.trim();
        }

        return Ok((JsonValue::Object(obj), remaining));
    }

    Ok((parse_text_value(content.trim()), remaining))
}

/// Parse scalar text content into the narrowest JSON value.
fn parse_text_value(text: &str) -> JsonValue {
    if let Ok(n) = text.parse::<i64>() {
        return JsonValue::Number(n.into());
    }
    if let Ok(n) = text.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(n) {
            return JsonValue::Number(num);
        }
    }
    match text.to_lowercase().as_str() {
        "true" => return JsonValue::Bool(true),
        "false" => return JsonValue::Bool(false),
        _ => {}
    }
    JsonValue::String(text.to_string())
}

/// Strip a repeating wrapper tag from converted XML JSON.
///
/// Any object whose only key is `tag` is replaced by its value, at every
/// depth (`{"item": {"id": 1}}` with tag `item` becomes `{"id": 1}`).
pub fn remove_xml_tag(tag: &str, value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(obj) => {
            if obj.len() == 1 && obj.contains_key(tag) {
                let inner = obj.into_iter().next().map(|(_, v)| v).unwrap_or_default();
                remove_xml_tag(tag, inner)
            } else {
                JsonValue::Object(
                    obj.into_iter()
                        .map(|(k, v)| (k, remove_xml_tag(tag, v)))
                        .collect(),
                )
            }
        }
        JsonValue::Array(items) => JsonValue::Array(
            items
                .into_iter()
                .map(|item| remove_xml_tag(tag, item))
                .collect(),
        ),
        other => other,
    }
}
