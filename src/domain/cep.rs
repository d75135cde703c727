//! Postal code (CEP) parsing and the `{"cep": ...}` request body.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ServiceError;

/// Number of digits in a CEP.
pub const CEP_LEN: usize = 8;

/// An 8-digit Brazilian postal code, no separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Accept exactly eight ASCII decimal digits.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        if is_valid_cep(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ServiceError::InvalidFormat(raw.to_string()))
        }
    }

    /// The eight digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `^\d{8}$` with ASCII digits only.
pub fn is_valid_cep(value: &str) -> bool {
    value.len() == CEP_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

/// Body of both `POST /cep` and `POST /weather`.
///
/// A missing or `null` `cep` deserializes to `None` and fails format validation
/// rather than body parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CepRequest {
    #[serde(default)]
    pub cep: Option<String>,
}

impl CepRequest {
    /// Parse a raw request body. Only a JSON object is accepted.
    pub fn from_body(body: &[u8]) -> Result<Self, ServiceError> {
        let object: Map<String, Value> =
            serde_json::from_slice(body).map_err(|e| ServiceError::MalformedInput(e.to_string()))?;
        Self::deserialize(Value::Object(object)).map_err(|e| ServiceError::MalformedInput(e.to_string()))
    }

    /// Parse the body and validate the code in one step.
    pub fn parse_postal_code(body: &[u8]) -> Result<PostalCode, ServiceError> {
        let request = Self::from_body(body)?;
        PostalCode::parse(request.cep.as_deref().unwrap_or_default())
    }
}

/// Outbound `{"cep": "<digits>"}` body.
#[derive(Debug, Serialize)]
pub struct CepPayload<'a> {
    pub cep: &'a str,
}

impl<'a> From<&'a PostalCode> for CepPayload<'a> {
    fn from(code: &'a PostalCode) -> Self {
        Self { cep: code.as_str() }
    }
}
