//! XML-RPC wire codec
//!
//! Decoding reads the document with `quick-xml` into a small element tree and
//! then walks it; encoding writes events straight into an in-memory buffer, so a
//! document is either produced whole or not at all.

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};
use thiserror::Error;

use crate::xmlrpc::{
    message::{MethodCall, MethodResponse},
    value::{Member, Value},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed xml: {0}")]
    Xml(String),
    #[error("expected <{expected}> element, found <{found}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },
    #[error("missing <{0}> element")]
    MissingElement(&'static str),
    #[error("value element has no payload")]
    MissingPayload,
    #[error("unsupported value type <{0}>")]
    UnsupportedType(String),
    #[error("invalid integer {0:?}")]
    InvalidInt(String),
}

/// Any failure to turn a request body into a [`MethodCall`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid XML-RPC request: {0}")]
pub struct MalformedRequest(#[from] pub DecodeError);

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write xml: {0}")]
    Xml(String),
}

/// Deepest element nesting accepted while reading a document.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    fn expect_name(&self, expected: &'static str) -> Result<(), DecodeError> {
        if self.name == expected {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedElement {
                expected,
                found: self.name.clone(),
            })
        }
    }
}

pub fn decode_method_call(body: &[u8]) -> Result<MethodCall, MalformedRequest> {
    let root = parse_document(body)?;
    Ok(method_call_from_element(&root)?)
}

/// Decodes a `methodResponse` document. Exactly one of `<params>` or `<fault>` must be present.
pub fn decode_method_response(body: &[u8]) -> Result<MethodResponse, DecodeError> {
    let root = parse_document(body)?;
    root.expect_name("methodResponse")?;

    match (root.child("params"), root.child("fault")) {
        (Some(params), None) => Ok(MethodResponse::Success(params_from_element(params)?)),
        (None, Some(fault)) => {
            let value = fault
                .child("value")
                .ok_or(DecodeError::MissingElement("value"))?;
            Ok(MethodResponse::Fault(value_from_element(value)?))
        }
        (Some(_), Some(_)) => Err(DecodeError::UnexpectedElement {
            expected: "params",
            found: "fault".to_string(),
        }),
        (None, None) => Err(DecodeError::MissingElement("params")),
    }
}

/// Decodes a standalone `<value>` document.
pub fn decode_value(xml: &[u8]) -> Result<Value, DecodeError> {
    value_from_element(&parse_document(xml)?)
}

pub fn encode_method_response(response: &MethodResponse) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new(Vec::new());
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    open(&mut writer, "methodResponse")?;
    match response {
        MethodResponse::Success(params) => {
            open(&mut writer, "params")?;
            for param in params {
                open(&mut writer, "param")?;
                write_value(&mut writer, param)?;
                close(&mut writer, "param")?;
            }
            close(&mut writer, "params")?;
        }
        MethodResponse::Fault(value) => {
            open(&mut writer, "fault")?;
            write_value(&mut writer, value)?;
            close(&mut writer, "fault")?;
        }
    }
    close(&mut writer, "methodResponse")?;
    Ok(writer.into_inner())
}

/// Encodes a single `<value>` fragment.
pub fn encode_value(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new(Vec::new());
    write_value(&mut writer, value)?;
    Ok(writer.into_inner())
}

fn method_call_from_element(root: &Element) -> Result<MethodCall, DecodeError> {
    root.expect_name("methodCall")?;

    let method_name = root
        .child("methodName")
        .map(|element| element.text.trim())
        .filter(|name| !name.is_empty())
        .ok_or(DecodeError::MissingElement("methodName"))?;

    let params = match root.child("params") {
        Some(params) => params_from_element(params)?,
        None => Vec::new(),
    };

    Ok(MethodCall::new(method_name, params))
}

fn params_from_element(params: &Element) -> Result<Vec<Value>, DecodeError> {
    params
        .children
        .iter()
        .map(|param| {
            param.expect_name("param")?;
            let value = param
                .child("value")
                .ok_or(DecodeError::MissingElement("value"))?;
            value_from_element(value)
        })
        .collect()
}

fn value_from_element(element: &Element) -> Result<Value, DecodeError> {
    element.expect_name("value")?;

    let payload = match element.children.as_slice() {
        [] => return Err(DecodeError::MissingPayload),
        [payload] => payload,
        [_, extra, ..] => {
            return Err(DecodeError::UnexpectedElement {
                expected: "/value",
                found: extra.name.clone(),
            })
        }
    };

    match payload.name.as_str() {
        "string" => Ok(Value::String(payload.text.clone())),
        "int" | "i4" | "i8" => payload
            .text
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| DecodeError::InvalidInt(payload.text.clone())),
        "struct" => payload
            .children
            .iter()
            .map(member_from_element)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Struct),
        other => Err(DecodeError::UnsupportedType(other.to_string())),
    }
}

fn member_from_element(element: &Element) -> Result<Member, DecodeError> {
    element.expect_name("member")?;
    let name = element
        .child("name")
        .ok_or(DecodeError::MissingElement("name"))?;
    let value = element
        .child("value")
        .ok_or(DecodeError::MissingElement("value"))?;

    Ok(Member {
        name: name.text.clone(),
        value: value_from_element(value)?,
    })
}

fn parse_document(body: &[u8]) -> Result<Element, DecodeError> {
    let source = std::str::from_utf8(body).map_err(|err| DecodeError::Xml(err.to_string()))?;
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader
            .read_event()
            .map_err(|err| DecodeError::Xml(err.to_string()))?
        {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(DecodeError::Xml("nesting too deep".to_string()));
                }
                stack.push(Element::named(element_name(&start)?));
            }
            Event::Empty(start) => {
                attach(&mut stack, &mut root, Element::named(element_name(&start)?))?
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DecodeError::Xml("unmatched closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| DecodeError::Xml(err.to_string()))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8(data.into_inner().into_owned())
                    .map_err(|err| DecodeError::Xml(err.to_string()))?;
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(DecodeError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| DecodeError::Xml("document has no root element".to_string()))
}

fn element_name(start: &BytesStart<'_>) -> Result<String, DecodeError> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|err| DecodeError::Xml(err.to_string()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(DecodeError::Xml("multiple root elements".to_string())),
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(element) => element.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(DecodeError::Xml("text outside root element".to_string())),
    }
    Ok(())
}

fn write_value(writer: &mut Writer<Vec<u8>>, value: &Value) -> Result<(), EncodeError> {
    open(writer, "value")?;
    match value {
        Value::String(text) => text_element(writer, "string", text)?,
        Value::Int(number) => text_element(writer, "int", &number.to_string())?,
        Value::Struct(members) => {
            open(writer, "struct")?;
            for member in members {
                open(writer, "member")?;
                text_element(writer, "name", &member.name)?;
                write_value(writer, &member.value)?;
                close(writer, "member")?;
            }
            close(writer, "struct")?;
        }
    }
    close(writer, "value")
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), EncodeError> {
    open(writer, name)?;
    write(writer, Event::Text(BytesText::new(text)))?;
    close(writer, name)
}

fn open(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), EncodeError> {
    write(writer, Event::Start(BytesStart::new(name)))
}

fn close(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), EncodeError> {
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), EncodeError> {
    writer
        .write_event(event)
        .map_err(|err| EncodeError::Xml(err.to_string()))
}
