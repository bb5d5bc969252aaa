use crate::{auth::SigningError, constants::HEADER_CONTENT_SHA256, constants::HEADER_DATE};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Everything except the RFC 3986 unreserved set `A-Za-z0-9-_.~`.
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Characters HTTP forbids in a header name besides controls and whitespace.
const HEADER_NAME_SEPARATORS: &str = "()<>@,;:\\\"/[]?={}";

/// Percent-encodes a query key or value. Space becomes `%20`.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, RFC3986).to_string()
}

/// Lower-case hex SHA-256 of a request body.
pub fn hash_payload(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// The parts of an HTTP request covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Hex SHA-256 of the body, see [`hash_payload`].
    pub body_hash: String,
}

impl SignableRequest {
    /// A request with an empty body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body_hash: hash_payload(&[]),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: &[u8]) -> Self {
        self.body_hash = hash_payload(body);
        self
    }
}

/// Canonical form of a [`SignableRequest`] at a given `X-Date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// `METHOD\nPATH\nQUERY\nHEADERS\n\nSIGNED_HEADERS\nBODY_HASH`
    pub text: String,
    /// Semicolon separated, sorted, lower-case header names.
    pub signed_headers: String,
}

impl CanonicalRequest {
    pub fn build(request: &SignableRequest, x_date: &str) -> Result<Self, SigningError> {
        let method = request.method.trim();
        if method.is_empty() {
            return Err(SigningError::EmptyMethod);
        }

        if !request.path.starts_with('/') {
            return Err(SigningError::InvalidPath(request.path.clone()));
        }

        let mut query: Vec<(String, String)> = request
            .query
            .iter()
            .map(|(key, value)| (encode_component(key), encode_component(value)))
            .collect();
        query.sort();
        let query = query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in &request.headers {
            let name = canonical_header_name(name)?;
            if name == HEADER_DATE.to_ascii_lowercase()
                || name == HEADER_CONTENT_SHA256.to_ascii_lowercase()
            {
                // Always taken from the signing inputs below.
                continue;
            }
            let value = canonical_header_value(&name, value)?;
            headers.entry(name).or_default().push(value);
        }
        headers.insert(HEADER_DATE.to_ascii_lowercase(), vec![x_date.to_string()]);
        headers.insert(
            HEADER_CONTENT_SHA256.to_ascii_lowercase(),
            vec![request.body_hash.clone()],
        );

        let canonical_headers = headers
            .iter()
            .map(|(name, values)| {
                let mut values = values.clone();
                values.sort();
                format!("{name}:{}", values.join(","))
            })
            .collect::<Vec<_>>()
            .join("\n");
        let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

        let text = format!(
            "{}\n{}\n{}\n{}\n\n{}\n{}",
            method.to_ascii_uppercase(),
            request.path,
            query,
            canonical_headers,
            signed_headers,
            request.body_hash
        );

        Ok(Self {
            text,
            signed_headers,
        })
    }

    /// Hex SHA-256 of the canonical text.
    pub fn digest(&self) -> String {
        hash_payload(self.text.as_bytes())
    }
}

fn canonical_header_name(name: &str) -> Result<String, SigningError> {
    let trimmed = name.trim();

    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_graphic() && !HEADER_NAME_SEPARATORS.contains(c));

    if !valid {
        return Err(SigningError::InvalidHeaderName(name.to_string()));
    }

    Ok(trimmed.to_ascii_lowercase())
}

fn canonical_header_value(name: &str, value: &str) -> Result<String, SigningError> {
    if value.chars().any(|c| c.is_control() && c != '\t') {
        return Err(SigningError::InvalidHeaderValue(name.to_string()));
    }

    Ok(value.trim().to_string())
}
