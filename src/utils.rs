use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

/// Genre keywords offered as suggestions by `genrelist genres`.
pub const POPULAR_GENRES: [&str; 20] = [
    "pop",
    "rock",
    "hip-hop",
    "electronic",
    "dance",
    "jazz",
    "classical",
    "r&b",
    "indie",
    "metal",
    "country",
    "reggae",
    "latin",
    "punk",
    "blues",
    "lo-fi",
    "soul",
    "folk",
    "house",
    "techno",
];

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Normalizes a playlist name for matching: surrounding whitespace is ignored
/// and comparison is case-insensitive.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn same_name(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

pub fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
