use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::errors::AppError;

/// Message returned when the request carried neither JSON nor form data.
pub const NO_DATA_MESSAGE: &str = "No data received or incorrect Content-Type header.";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Lead submitted by Collect.chat, as a flat key/value bag.
///
/// Recognized keys are `name`, `last_name`, `email`, `phone`, `nationality`,
/// `tenure`, `type`, `page` and `ip`; anything else is carried along untouched
/// so it can be echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InboundLead {
    fields: Map<String, Value>,
}

impl InboundLead {
    /// Extracts the lead from a raw request body.
    ///
    /// JSON is tried first whatever the `Content-Type` says. Form data is only
    /// read when no usable JSON was found and the request declares a
    /// form-urlencoded body.
    pub fn extract(content_type: Option<&str>, body: &[u8]) -> Result<Self, AppError> {
        if let Some(lead) = Self::from_json_body(body)? {
            return Ok(lead);
        }

        if is_form_content_type(content_type) {
            if let Some(lead) = Self::from_form_body(body) {
                return Ok(lead);
            }
        }

        Err(AppError::BadRequest(NO_DATA_MESSAGE.to_string()))
    }

    /// Parses a JSON body.
    ///
    /// Returns `Ok(None)` for unparseable or empty-ish JSON (`null`, `{}`,
    /// `""`, ...). A non-empty value that is not an object cannot be mapped
    /// to lead fields and is reported as a mapping error.
    pub fn from_json_body(body: &[u8]) -> Result<Option<Self>, AppError> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Body is not JSON ({}), trying form data", e);
                return Ok(None);
            }
        };

        if !is_truthy(&value) {
            return Ok(None);
        }

        match value {
            Value::Object(fields) => Ok(Some(Self { fields })),
            other => Err(AppError::MappingError(format!(
                "expected a JSON object with lead fields, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Parses a form-urlencoded body. The first occurrence of a repeated key wins.
    pub fn from_form_body(body: &[u8]) -> Option<Self> {
        let mut fields = Map::new();
        for (key, value) in url::form_urlencoded::parse(body) {
            fields
                .entry(key.into_owned())
                .or_insert_with(|| Value::String(value.into_owned()));
        }

        if fields.is_empty() {
            None
        } else {
            Some(Self { fields })
        }
    }

    /// Returns the value for `key`, or an empty string when it is absent or null.
    ///
    /// Values are normalized to text: non-string JSON values (numbers,
    /// booleans) are rendered as their JSON text, so `{"phone": 123}` reaches
    /// Bitrix24 as `"123"`, exactly like the form-encoded equivalent.
    pub fn get(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// The key/value bag as received.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for InboundLead {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

fn is_form_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Body of a Bitrix24 `crm.lead.add` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmRecord {
    pub fields: LeadFields,
}

/// Lead fields understood by Bitrix24.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LeadFields {
    pub title: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: Vec<MultiField>,
    pub phone: Vec<MultiField>,
    /// `UF_CRM_*` user fields
    #[serde(flatten)]
    pub custom: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub source_id: String,
}

/// Entry of a Bitrix24 multi-field (EMAIL, PHONE).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MultiField {
    pub value: String,
    pub value_type: String,
}

impl MultiField {
    pub fn work(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            value_type: "WORK".to_string(),
        }
    }
}
