//! XML → JSON normalization for SOAP replies.
//!
//! Device firmware is inconsistent about which optional fields it returns and
//! whether it includes attributes, so replies are flattened into a
//! `serde_json::Value` and fields are read from that instead of walking the
//! element tree.
//!
//! Rules:
//! * an element with no attributes and no child elements becomes a string
//!   (its text, or `""`),
//! * otherwise it becomes an object: attributes under `"@name"`, child
//!   elements under their local name, text (if any) under `"#text"`,
//! * a child name that repeats becomes an array.

use serde_json::{Map, Value};
use xmltree::{Element, XMLNode};

/// Convert an element into its normalized JSON shape.
pub fn to_json(element: &Element) -> Value {
    let children: Vec<&Element> = element
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Element(e) => Some(e),
            _ => None,
        })
        .collect();

    let text = element_text(element);

    if children.is_empty() && element.attributes.is_empty() {
        return Value::String(text);
    }

    let mut map = Map::new();

    for (name, value) in &element.attributes {
        map.insert(format!("@{}", name), Value::String(value.clone()));
    }

    for child in children {
        let value = to_json(child);
        match map.get_mut(&child.name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(child.name.clone(), value);
            }
        }
    }

    if !text.trim().is_empty() {
        map.insert("#text".to_string(), Value::String(text));
    }

    Value::Object(map)
}

/// Read a string field from a normalized object.
///
/// Accepts both the plain-string shape and the object shape produced when an
/// element carries attributes (`{"@val": "..", "#text": ".."}`).
pub fn field<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    match value.get(name)? {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("#text").and_then(Value::as_str),
        _ => None,
    }
}

fn element_text(element: &Element) -> String {
    element
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Text(t) | XMLNode::CData(t) => Some(t.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_leaf_elements_become_strings() {
        let xml = parse(
            "<GetVolumeResponse><CurrentVolume>37</CurrentVolume></GetVolumeResponse>",
        );
        assert_eq!(to_json(&xml), json!({ "CurrentVolume": "37" }));
    }

    #[test]
    fn test_empty_leaf_is_empty_string() {
        let xml = parse("<R><TrackMetaData></TrackMetaData><TrackURI/></R>");
        assert_eq!(to_json(&xml), json!({ "TrackMetaData": "", "TrackURI": "" }));
    }

    #[test]
    fn test_repeated_children_become_array() {
        let xml = parse("<list><app>a</app><app>b</app><app>c</app></list>");
        assert_eq!(to_json(&xml), json!({ "app": ["a", "b", "c"] }));
    }

    #[test]
    fn test_attributes_and_text() {
        let xml = parse(r#"<R><Volume channel="Master">12</Volume></R>"#);
        let value = to_json(&xml);
        assert_eq!(value, json!({ "Volume": { "@channel": "Master", "#text": "12" } }));
        assert_eq!(field(&value, "Volume"), Some("12"));
    }

    #[test]
    fn test_namespace_prefixes_are_dropped() {
        let xml = parse(
            r#"<u:GetMuteResponse xmlns:u="urn:schemas-upnp-org:service:RenderingControl:1"><CurrentMute>1</CurrentMute></u:GetMuteResponse>"#,
        );
        assert_eq!(field(&to_json(&xml), "CurrentMute"), Some("1"));
    }

    #[test]
    fn test_field_missing() {
        let value = json!({ "A": "1", "B": ["x", "y"] });
        assert_eq!(field(&value, "C"), None);
        assert_eq!(field(&value, "B"), None);
    }
}
