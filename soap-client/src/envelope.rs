//! SOAP 1.1 envelope construction and XML entity helpers.
//!
//! Everything in here is pure string work: no I/O and no state. The
//! transport layer calls [`build`] for the request body and [`soap_action`]
//! for the matching `SOAPAction` header.

/// Namespace of the SOAP 1.1 envelope.
pub const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Encoding style advertised on every envelope.
pub const ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// UPnP service URN for a service name, version 1.
///
/// ```
/// assert_eq!(
///     soap_client::envelope::service_urn("RenderingControl"),
///     "urn:schemas-upnp-org:service:RenderingControl:1"
/// );
/// ```
pub fn service_urn(service: &str) -> String {
    format!("urn:schemas-upnp-org:service:{}:1", service)
}

/// Value of the `SOAPAction` header, quotes included.
pub fn soap_action(service: &str, action: &str) -> String {
    format!("\"{}#{}\"", service_urn(service), action)
}

/// Build a complete SOAP envelope.
///
/// `arguments` is an already-serialized XML fragment placed verbatim inside
/// the `<u:{action}>` element, so any text it carries must be escaped by the
/// caller (see [`escape`]).
pub fn build(action: &str, service: &str, arguments: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <s:Envelope xmlns:s=\"{envelope_ns}\" s:encodingStyle=\"{encoding}\">\n\
         <s:Body>\n\
         <u:{action} xmlns:u=\"{urn}\">\n\
         {arguments}\n\
         </u:{action}>\n\
         </s:Body>\n\
         </s:Envelope>",
        envelope_ns = ENVELOPE_NS,
        encoding = ENCODING_STYLE,
        action = action,
        urn = service_urn(service),
        arguments = arguments,
    )
}

/// Escape text for use inside an XML element or attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Undo one level of entity escaping.
///
/// Only the five predefined XML entities are recognised; anything else is
/// copied through unchanged. `&amp;` is handled last so `&amp;lt;` becomes
/// `&lt;` rather than `<`.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let replacement = [
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&apos;", '\''),
            ("&amp;", '&'),
        ]
        .iter()
        .find(|(entity, _)| rest.starts_with(entity));

        match replacement {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Remove namespace prefixes from element and attribute names and drop
/// `xmlns` declarations.
///
/// Embedded metadata documents from some firmware use `dc:`/`upnp:` prefixes
/// without declaring them, which a conforming parser rejects. Stripping the
/// prefixes first lets those documents parse, and lookups then work on local
/// names only.
pub fn strip_namespaces(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];

        let close = match rest.find('>') {
            Some(close) => close,
            None => break,
        };
        let tag = &rest[1..close];
        rest = &rest[close + 1..];

        if tag.starts_with('?') || tag.starts_with('!') {
            out.push('<');
            out.push_str(tag);
            out.push('>');
            continue;
        }

        out.push('<');
        out.push_str(&strip_tag(tag));
        out.push('>');
    }

    out.push_str(rest);
    out
}

fn strip_tag(tag: &str) -> String {
    let (closing, body) = match tag.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, tag),
    };
    let (body, self_closing) = match body.strip_suffix('/') {
        Some(body) => (body, true),
        None => (body, false),
    };

    let mut out = String::with_capacity(tag.len());
    if closing {
        out.push('/');
    }

    let name_end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    out.push_str(local_name(&body[..name_end]));

    for attr in split_attributes(&body[name_end..]) {
        let (name, value) = match attr.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => continue,
        };
        if name == "xmlns" || name.starts_with("xmlns:") {
            continue;
        }
        out.push(' ');
        out.push_str(local_name(name));
        out.push('=');
        out.push_str(value);
    }

    if self_closing {
        out.push('/');
    }
    out
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

/// Split `a="1" b='x y'` into `a="1"` and `b='x y'`, honouring quotes.
fn split_attributes(attrs: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = None;
    let mut quote = None;

    for (i, c) in attrs.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, c) if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    parts.push(&attrs[s..i]);
                }
            }
            (None, _) => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
        if start.is_none() && quote.is_some() {
            start = Some(i);
        }
    }

    if let Some(s) = start {
        parts.push(&attrs[s..]);
    }
    parts
}
