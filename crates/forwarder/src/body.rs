//! Inbound request bodies.

use crate::errors::{ForwardError, Result};
use bytes::Bytes;
use serde_json::{Map, Value};

/// A parsed inbound JSON object, with the original bytes kept for verbatim
/// forwarding.
#[derive(Debug, Clone)]
pub struct InboundBody {
    raw: Bytes,
    fields: Map<String, Value>,
}

impl InboundBody {
    /// Parses an inbound body. Blank input counts as `{}`.
    pub fn parse(raw: Bytes) -> Result<Self> {
        if is_blank(&raw) {
            return Ok(Self::empty());
        }

        match serde_json::from_slice::<Value>(&raw).map_err(ForwardError::InvalidBody)? {
            Value::Object(fields) => Ok(Self { raw, fields }),
            _ => Err(ForwardError::BodyNotObject),
        }
    }

    pub fn empty() -> Self {
        Self {
            raw: Bytes::from_static(b"{}"),
            fields: Map::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field only when it is present and truthy.
    pub fn truthy(&self, field: &str) -> Option<&Value> {
        self.get(field).filter(|value| is_truthy(value))
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }
}

impl From<Map<String, Value>> for InboundBody {
    fn from(fields: Map<String, Value>) -> Self {
        let raw = Bytes::from(Value::Object(fields.clone()).to_string());
        Self { raw, fields }
    }
}

/// Truthiness as JSON clients expect it: `null`, `false`, `0` and `""` are
/// falsy, every array and object is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Largest float that still converts to an integer without losing digits.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Renders a value for use in a path segment or query string. Floats with
/// no fractional part render as integers (`10.0` becomes `10`).
pub(crate) fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float)
                if number.is_f64() && float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER =>
            {
                (float as i64).to_string()
            }
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}

pub(crate) fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_body_is_an_empty_object() {
        let body = InboundBody::parse(Bytes::from_static(b"  \n")).unwrap();

        assert!(body.get("workflowId").is_none());
        assert_eq!(body.raw().as_ref(), b"{}");
    }

    #[test]
    fn raw_bytes_are_kept_as_sent() {
        let sent = Bytes::from_static(br#"{"name":"X","nodes":[],"connections":{}}"#);
        let body = InboundBody::parse(sent.clone()).unwrap();

        assert_eq!(body.raw(), &sent);
        assert_eq!(body.get("name"), Some(&json!("X")));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let result = InboundBody::parse(Bytes::from_static(b"{workflowId:"));

        assert!(matches!(result, Err(ForwardError::InvalidBody(_))));
    }

    #[test]
    fn non_object_json_is_rejected() {
        let result = InboundBody::parse(Bytes::from_static(b"[1, 2]"));

        assert!(matches!(result, Err(ForwardError::BodyNotObject)));
    }

    #[test]
    fn truthiness_matches_json_clients() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!(-3), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn truthy_filters_out_falsy_fields() {
        let body = InboundBody::parse(Bytes::from_static(br#"{"limit":0,"lastId":"12"}"#)).unwrap();

        assert!(body.truthy("limit").is_none());
        assert_eq!(body.truthy("lastId"), Some(&json!("12")));
        assert!(body.truthy("workflowId").is_none());
    }

    #[test]
    fn scalars_render_without_quotes() {
        assert_eq!(render_scalar(&json!("abc")), "abc");
        assert_eq!(render_scalar(&json!(10)), "10");
        assert_eq!(render_scalar(&json!(true)), "true");
    }

    #[test]
    fn whole_floats_render_as_integers() {
        assert_eq!(render_scalar(&json!(10.0)), "10");
        assert_eq!(render_scalar(&json!(-3.0)), "-3");
        assert_eq!(render_scalar(&json!(2.5)), "2.5");
        assert_eq!(render_scalar(&json!(u64::MAX)), u64::MAX.to_string());
    }
}
