//! XML-RPC request encoding and response decoding.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

use super::value::Value;
use crate::error::HubError;

/// Encode a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>\n");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Nil => out.push_str("<nil/>"),
        Value::Bool(b) => {
            out.push_str(if *b {
                "<boolean>1</boolean>"
            } else {
                "<boolean>0</boolean>"
            });
        }
        Value::Int(i) => {
            // Plain <int> is 32-bit; Koji hubs accept <i8> for the rest.
            let tag = if i32::try_from(*i).is_ok() { "int" } else { "i8" };
            out.push_str(&format!("<{tag}>{i}</{tag}>"));
        }
        Value::Double(d) => out.push_str(&format!("<double>{d}</double>")),
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::DateTime(s) => {
            out.push_str("<dateTime.iso8601>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</dateTime.iso8601>");
        }
        Value::Base64(s) => {
            out.push_str("<base64>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</base64>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

/// Decode a `methodResponse` document.
///
/// A `<fault>` response becomes [`HubError::Fault`].
pub fn decode_response(body: &str) -> Result<Value, HubError> {
    let mut parser = Parser::new(body);
    parser.expect_open("methodResponse")?;

    match parser.next_tag()? {
        Token::Open(tag) if tag == "params" => {
            parser.expect_open("param")?;
            let value = parser.value()?;
            parser.expect_close("param")?;
            parser.expect_close("params")?;
            parser.expect_close("methodResponse")?;
            Ok(value)
        }
        Token::Open(tag) if tag == "fault" => {
            let value = parser.value()?;
            Err(fault_from_value(&value))
        }
        other => Err(HubError::decode(format!(
            "expected <params> or <fault>, found {other}"
        ))),
    }
}

fn fault_from_value(value: &Value) -> HubError {
    let code = value.get("faultCode").and_then(Value::as_i64);
    let message = value.get("faultString").and_then(Value::as_str);
    match (code, message) {
        (Some(code), Some(message)) => HubError::Fault {
            code,
            message: message.to_string(),
        },
        _ => HubError::decode("fault without faultCode/faultString"),
    }
}

enum Token {
    Open(String),
    Empty(String),
    Close(String),
    Text(String),
    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Open(name) => write!(f, "<{name}>"),
            Token::Empty(name) => write!(f, "<{name}/>"),
            Token::Close(name) => write!(f, "</{name}>"),
            Token::Text(text) => write!(f, "text {text:?}"),
            Token::Eof => write!(f, "end of document"),
        }
    }
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Parser<'a> {
    fn new(body: &'a str) -> Self {
        Self {
            reader: Reader::from_str(body),
        }
    }

    fn next_token(&mut self) -> Result<Token, HubError> {
        loop {
            let event = self
                .reader
                .read_event()
                .map_err(|e| HubError::decode(e.to_string()))?;

            return Ok(match event {
                Event::Start(e) => Token::Open(element_name(e.name().as_ref())),
                Event::Empty(e) => Token::Empty(element_name(e.name().as_ref())),
                Event::End(e) => Token::Close(element_name(e.name().as_ref())),
                Event::Text(t) => Token::Text(
                    t.unescape()
                        .map_err(|e| HubError::decode(e.to_string()))?
                        .into_owned(),
                ),
                Event::CData(c) => Token::Text(
                    String::from_utf8(c.into_inner().into_owned())
                        .map_err(|e| HubError::decode(e.to_string()))?,
                ),
                Event::Eof => Token::Eof,
                _ => continue,
            });
        }
    }

    /// Next token that is not inter-element whitespace.
    fn next_tag(&mut self) -> Result<Token, HubError> {
        loop {
            match self.next_token()? {
                Token::Text(text) if text.trim().is_empty() => continue,
                token => return Ok(token),
            }
        }
    }

    fn expect_open(&mut self, name: &str) -> Result<(), HubError> {
        match self.next_tag()? {
            Token::Open(tag) if tag == name => Ok(()),
            other => Err(HubError::decode(format!("expected <{name}>, found {other}"))),
        }
    }

    fn expect_close(&mut self, name: &str) -> Result<(), HubError> {
        match self.next_tag()? {
            Token::Close(tag) if tag == name => Ok(()),
            other => Err(HubError::decode(format!(
                "expected </{name}>, found {other}"
            ))),
        }
    }

    /// Parse a complete `<value>` element.
    fn value(&mut self) -> Result<Value, HubError> {
        match self.next_tag()? {
            Token::Open(tag) if tag == "value" => self.value_body(),
            Token::Empty(tag) if tag == "value" => Ok(Value::String(String::new())),
            other => Err(HubError::decode(format!("expected <value>, found {other}"))),
        }
    }

    /// Parse the content of a `<value>` whose start tag was consumed.
    fn value_body(&mut self) -> Result<Value, HubError> {
        let (text, token) = match self.next_token()? {
            Token::Text(text) => (Some(text), self.next_token()?),
            token => (None, token),
        };

        let stray_text = text.as_deref().is_some_and(|t| !t.trim().is_empty());
        let value = match token {
            // Untyped values are strings
            Token::Close(tag) if tag == "value" => {
                return Ok(Value::String(text.unwrap_or_default()));
            }
            Token::Open(tag) if !stray_text => self.typed(&tag)?,
            Token::Empty(tag) if !stray_text => empty_typed(&tag)?,
            other => {
                return Err(HubError::decode(format!(
                    "unexpected {other} inside <value>"
                )));
            }
        };

        self.expect_close("value")?;
        Ok(value)
    }

    fn typed(&mut self, tag: &str) -> Result<Value, HubError> {
        match tag {
            "int" | "i4" | "i8" => {
                let text = self.text_until(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Int)
                    .map_err(|_| HubError::decode(format!("invalid integer {text:?}")))
            }
            "boolean" => match self.text_until(tag)?.trim() {
                "1" => Ok(Value::Bool(true)),
                "0" => Ok(Value::Bool(false)),
                other => Err(HubError::decode(format!("invalid boolean {other:?}"))),
            },
            "double" => {
                let text = self.text_until(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Double)
                    .map_err(|_| HubError::decode(format!("invalid double {text:?}")))
            }
            "string" => Ok(Value::String(self.text_until(tag)?)),
            "dateTime.iso8601" => Ok(Value::DateTime(self.text_until(tag)?.trim().to_string())),
            "base64" => Ok(Value::Base64(self.text_until(tag)?.trim().to_string())),
            "nil" => {
                self.expect_close("nil")?;
                Ok(Value::Nil)
            }
            "array" => self.array_body(),
            "struct" => self.struct_body(),
            other => Err(HubError::decode(format!("unknown value type <{other}>"))),
        }
    }

    fn text_until(&mut self, tag: &str) -> Result<String, HubError> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(chunk) => text.push_str(&chunk),
                Token::Close(name) if name == tag => return Ok(text),
                other => {
                    return Err(HubError::decode(format!(
                        "unexpected {other} inside <{tag}>"
                    )));
                }
            }
        }
    }

    fn array_body(&mut self) -> Result<Value, HubError> {
        let mut items = Vec::new();
        match self.next_tag()? {
            Token::Open(tag) if tag == "data" => loop {
                match self.next_tag()? {
                    Token::Open(tag) if tag == "value" => items.push(self.value_body()?),
                    Token::Empty(tag) if tag == "value" => items.push(Value::String(String::new())),
                    Token::Close(tag) if tag == "data" => break,
                    other => {
                        return Err(HubError::decode(format!(
                            "unexpected {other} inside <data>"
                        )));
                    }
                }
            },
            Token::Empty(tag) if tag == "data" => {}
            other => return Err(HubError::decode(format!("expected <data>, found {other}"))),
        }
        self.expect_close("array")?;
        Ok(Value::Array(items))
    }

    fn struct_body(&mut self) -> Result<Value, HubError> {
        let mut members = BTreeMap::new();
        loop {
            match self.next_tag()? {
                Token::Open(tag) if tag == "member" => {
                    self.expect_open("name")?;
                    let name = self.text_until("name")?;
                    let value = self.value()?;
                    self.expect_close("member")?;
                    members.insert(name, value);
                }
                Token::Close(tag) if tag == "struct" => return Ok(Value::Struct(members)),
                other => {
                    return Err(HubError::decode(format!(
                        "unexpected {other} inside <struct>"
                    )));
                }
            }
        }
    }
}

fn empty_typed(tag: &str) -> Result<Value, HubError> {
    match tag {
        "nil" => Ok(Value::Nil),
        "string" => Ok(Value::String(String::new())),
        "array" => Ok(Value::Array(Vec::new())),
        "struct" => Ok(Value::Struct(BTreeMap::new())),
        other => Err(HubError::decode(format!("empty <{other}/> value"))),
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
