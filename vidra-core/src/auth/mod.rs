//! Credential primitives: token lifecycle and password hashing.

pub mod hasher;
pub mod tokens;

pub use hasher::{ArgonHasher, Hasher};
pub use tokens::{DEFAULT_ACCESS_TTL_SECS, SessionTokens, TokenService};
