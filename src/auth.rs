mod canonical;
mod credential;
mod signer;
mod signing_error;

pub use canonical::{CanonicalRequest, SignableRequest, encode_component, hash_payload};
pub use credential::Credential;
pub use signer::{CredentialSigner, SignedHeaders};
pub use signing_error::SigningError;
