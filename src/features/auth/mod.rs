//! Bearer token authorization.
//!
//! Tokens are RS256 JWTs issued by the identity provider. The signing key is
//! looked up by `kid` in the provider's JWKS and rebuilt from the first
//! certificate of its `x5c` chain.

mod authorizer;
mod jwks;

pub mod dto;
pub mod handler;
pub mod model;
pub mod routes;

pub use authorizer::{AuthDecision, TokenAuthorizer};
pub use jwks::JwksClient;
