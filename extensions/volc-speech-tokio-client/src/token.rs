mod clock;
mod token_cache;
mod token_issuer;

pub use clock::{Clock, SystemClock};
pub use token_cache::{Token, TokenCache};
pub use token_issuer::{IssuedToken, OpenApiTokenIssuer, TokenIssuer, TokenRequest, TokenResponse};
