use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// Entropy per session id. 32 bytes encodes to a 43-character token.
const SESSION_ID_BYTES: usize = 32;

/// Generates a cryptographically random, URL-safe session id.
#[must_use]
pub fn generate_session_id() -> String {
    let random_bytes: [u8; SESSION_ID_BYTES] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}
