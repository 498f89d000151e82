//! Identity-seeded pseudo-randomness for pricing.

use sha2::{Digest, Sha256};

/// Seed token used when a record has neither a reference id nor a name.
pub const FALLBACK_SEED: &str = "asteroid";

/// 32-bit hash of an identity string (leading four bytes of its SHA-256).
pub fn hash32(input: &str) -> u32 {
    let digest = Sha256::digest(input.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// One mulberry32 step, mapped to [0, 1).
pub fn unit_from_seed(seed: u32) -> f64 {
    let mut t = seed.wrapping_add(0x6D2B_79F5);
    t = (t ^ (t >> 15)).wrapping_mul(t | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    f64::from(t ^ (t >> 14)) / 4_294_967_296.0
}

/// Deterministic value in [0, 1) for a record identity.
pub fn identity_unit(reference_id: Option<&str>, name: Option<&str>) -> f64 {
    let token = reference_id
        .filter(|s| !s.is_empty())
        .or(name.filter(|s| !s.is_empty()))
        .unwrap_or(FALLBACK_SEED);
    unit_from_seed(hash32(token))
}
