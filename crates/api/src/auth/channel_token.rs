//! HMAC-SHA256 channel authorization tokens.
//!
//! A channel token proves that the authorization endpoint approved a
//! specific `(channel, user)` pair. The WebSocket handler verifies the
//! token on each subscribe frame, so subscription authorization never
//! needs a second database round-trip.
//!
//! Tokens are not time-limited: they are scoped to a single channel and a
//! single user, and membership revocation is enforced again at publish
//! time for private user channels (the only class where it matters).

use confab_core::channels::Channel;
use confab_core::error::CoreError;
use confab_core::types::DbId;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sign a `(channel, user)` pair, returning the hex-encoded MAC.
pub fn sign_channel(channel: &Channel, user_id: DbId, secret: &str) -> Result<String, CoreError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::Internal(format!("Invalid channel token key: {e}")))?;
    mac.update(token_message(channel, user_id).as_bytes());
    Ok(hex_encode(&mac.finalize().into_bytes()))
}

/// Verify a hex-encoded channel token against a `(channel, user)` pair.
///
/// Any decode or key failure verifies as `false`; the caller treats that
/// the same as a forged token.
pub fn verify_channel(token: &str, channel: &Channel, user_id: DbId, secret: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(token_message(channel, user_id).as_bytes());

    let Some(provided) = hex_decode(token) else {
        return false;
    };
    mac.verify_slice(&provided).is_ok()
}

fn token_message(channel: &Channel, user_id: DbId) -> String {
    format!("{}:{user_id}", channel.name())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        },
    )
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "channel-token-test-secret";

    #[test]
    fn sign_and_verify_round_trip() {
        let channel = Channel::Meeting(42);
        let token = sign_channel(&channel, 7, SECRET).expect("signing should succeed");

        assert!(verify_channel(&token, &channel, 7, SECRET));
    }

    #[test]
    fn token_is_bound_to_the_channel() {
        let token = sign_channel(&Channel::Meeting(42), 7, SECRET).expect("signing");

        assert!(!verify_channel(&token, &Channel::Meeting(43), 7, SECRET));
        assert!(!verify_channel(&token, &Channel::Note(42), 7, SECRET));
    }

    #[test]
    fn token_is_bound_to_the_user() {
        let token = sign_channel(&Channel::User(7), 7, SECRET).expect("signing");

        assert!(!verify_channel(&token, &Channel::User(7), 8, SECRET));
    }

    #[test]
    fn garbage_tokens_verify_false() {
        let channel = Channel::Note(1);
        assert!(!verify_channel("not-hex-at-all", &channel, 1, SECRET));
        assert!(!verify_channel("abc", &channel, 1, SECRET)); // odd length
        assert!(!verify_channel("", &channel, 1, SECRET));
    }

    #[test]
    fn different_secrets_do_not_cross_verify() {
        let channel = Channel::MeetingPresence(5);
        let token = sign_channel(&channel, 2, SECRET).expect("signing");

        assert!(!verify_channel(&token, &channel, 2, "some-other-secret"));
    }
}
