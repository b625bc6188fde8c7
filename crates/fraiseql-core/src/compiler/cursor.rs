//! Plaintext cursor token shape.
//!
//! The token format is `<prefix><selId>[<sep><v0><sep><v1>...]`: a
//! fixed one-byte prefix identifying the token as a cursor (so a
//! misrouted plain string fails fast instead of silently decoding),
//! the id of the `Select` the cursor was issued for, and the ordered
//! column values from `order_by` at the cursor row. Encryption of this
//! string into the opaque token handed to clients is [`crate::cipher`]'s
//! job; this module only knows the plaintext shape.

use crate::error::{Error, Result};

const PREFIX: char = 'c';
const SEP: char = '.';

/// Decoded cursor: which select it was issued against, and the ordered
/// `order_by` column values of the row it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainCursor {
    pub select_id: u32,
    pub values: Vec<serde_json::Value>,
}

impl PlainCursor {
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(PREFIX);
        out.push_str(&self.select_id.to_string());
        for v in &self.values {
            out.push(SEP);
            out.push_str(&encode_value(v));
        }
        out
    }

    pub fn decode(token: &str) -> Result<Self> {
        let mut chars = token.chars();
        if chars.next() != Some(PREFIX) {
            return Err(Error::parse("malformed cursor: missing prefix"));
        }
        let rest = chars.as_str();
        let mut parts = rest.split(SEP);
        let select_id: u32 = parts
            .next()
            .ok_or_else(|| Error::parse("malformed cursor: missing select id"))?
            .parse()
            .map_err(|_| Error::parse("malformed cursor: select id is not numeric"))?;
        let values = parts.map(decode_value).collect::<Result<Vec<_>>>()?;
        Ok(Self { select_id, values })
    }
}

/// Values are encoded with a one-letter type tag so decoding doesn't have
/// to guess between a numeric string and a number.
fn encode_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => format!("s:{s}"),
        serde_json::Value::Number(n) => format!("n:{n}"),
        serde_json::Value::Bool(b) => format!("b:{b}"),
        serde_json::Value::Null => "z:".to_string(),
        other => format!("j:{other}"),
    }
}

fn decode_value(part: &str) -> Result<serde_json::Value> {
    let (tag, rest) = part.split_once(':').ok_or_else(|| Error::parse("malformed cursor value"))?;
    match tag {
        "s" => Ok(serde_json::Value::String(rest.to_string())),
        "n" => rest
            .parse::<f64>()
            .map(|n| serde_json::json!(n))
            .map_err(|_| Error::parse("malformed cursor value: not numeric")),
        "b" => rest
            .parse::<bool>()
            .map(serde_json::Value::Bool)
            .map_err(|_| Error::parse("malformed cursor value: not boolean")),
        "z" => Ok(serde_json::Value::Null),
        "j" => serde_json::from_str(rest).map_err(|_| Error::parse("malformed cursor value: invalid json")),
        _ => Err(Error::parse("malformed cursor value: unknown type tag")),
    }
}
