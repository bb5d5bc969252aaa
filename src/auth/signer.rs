use crate::{
    auth::{CanonicalRequest, Credential, SignableRequest, SigningError},
    constants::{
        HEADER_AUTHORIZATION, HEADER_CONTENT_SHA256, HEADER_DATE, SIGNING_ALGORITHM,
        SIGNING_DATE_FORMAT, SIGNING_SCOPE_TERMINATOR, SIGNING_TIMESTAMP_FORMAT,
    },
};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Headers to attach to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub x_date: String,
    pub content_sha256: String,
}

impl SignedHeaders {
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (HEADER_AUTHORIZATION, self.authorization.as_str()),
            (HEADER_DATE, self.x_date.as_str()),
            (HEADER_CONTENT_SHA256, self.content_sha256.as_str()),
        ]
    }
}

/// Produces scoped HMAC-SHA256 signatures for control-plane requests.
///
/// The signing key is derived per calendar day:
///
/// ```text
/// kDate    = HMAC(secret, YYYYMMDD)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "request")
/// ```
///
/// Signing is a pure function of the credential, the request and the
/// timestamp.
#[derive(Debug, Clone)]
pub struct CredentialSigner {
    credential: Credential,
}

impl CredentialSigner {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// `<date>/<region>/<service>/request`
    pub fn credential_scope(&self, date: &str) -> String {
        format!(
            "{date}/{}/{}/{SIGNING_SCOPE_TERMINATOR}",
            self.credential.region(),
            self.credential.service()
        )
    }

    pub fn signing_key(&self, date: &str) -> Result<Vec<u8>, SigningError> {
        let k_date = hmac_sha256(self.credential.secret_access_key().as_bytes(), date.as_bytes())?;
        let k_region = hmac_sha256(&k_date, self.credential.region().as_bytes())?;
        let k_service = hmac_sha256(&k_region, self.credential.service().as_bytes())?;
        hmac_sha256(&k_service, SIGNING_SCOPE_TERMINATOR.as_bytes())
    }

    pub fn sign(
        &self,
        request: &SignableRequest,
        timestamp: DateTime<Utc>,
    ) -> Result<SignedHeaders, SigningError> {
        let x_date = timestamp.format(SIGNING_TIMESTAMP_FORMAT).to_string();
        let date = timestamp.format(SIGNING_DATE_FORMAT).to_string();

        let canonical = CanonicalRequest::build(request, &x_date)?;
        let scope = self.credential_scope(&date);
        let string_to_sign = format!(
            "{SIGNING_ALGORITHM}\n{x_date}\n{scope}\n{}",
            canonical.digest()
        );

        tracing::trace!(
            canonical_request = %canonical.text,
            string_to_sign = %string_to_sign,
            "signing request"
        );

        let key = self.signing_key(&date)?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(SignedHeaders {
            authorization: format!(
                "{SIGNING_ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
                self.credential.access_key_id(),
                canonical.signed_headers
            ),
            x_date,
            content_sha256: request.body_hash.clone(),
        })
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|err| SigningError::InvalidKey(err.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
