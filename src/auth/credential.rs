use serde::Deserialize;
use std::fmt;

/// Access key pair scoped to one service in one region.
///
/// The secret key is never included in `Debug` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    access_key_id: String,
    secret_access_key: String,
    service: String,
    region: String,
}

impl Credential {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        service: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            service: service.into(),
            region: region.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// The same key pair scoped to another service and region.
    pub fn scoped(&self, service: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            service: service.into(),
            region: region.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("service", &self.service)
            .field("region", &self.region)
            .finish()
    }
}
