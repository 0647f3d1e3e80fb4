//! Authentication primitives: JWT access tokens, password hashing, and
//! HMAC channel authorization tokens.

pub mod channel_token;
pub mod jwt;
pub mod password;
