// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
/** Secure token generation for email verification links.
Tokens are drawn from OS entropy and hex encoded so they can sit in a URL
path without escaping. */
use rand::{rngs::OsRng, RngCore};

/// Default token size in bytes (32 bytes = 256 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 32;

/** Generate a cryptographically secure random token
# Returns
A lowercase hex string, 64 characters long */
pub fn generate_secure_token() -> String {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes
# Returns
A lowercase hex string of `2 * bytes` characters */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);
    hex::encode(buffer)
}
