use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

const SALT_BYTES: usize = 16;
const KDF_ITERATIONS: u32 = 100_000;
const DERIVED_KEY_BYTES: usize = 32;

/// Derived credential material stored alongside the user row.
#[derive(Debug, Clone)]
pub struct DerivedPassword {
    pub hash: String,
    pub salt: String,
}

pub fn hash_password(password: &str) -> anyhow::Result<DerivedPassword> {
    let mut salt = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt);
    let salt = BASE64.encode(salt);
    let hash = derive_key(password, &salt)?;
    Ok(DerivedPassword { hash, salt })
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> anyhow::Result<bool> {
    let derived = derive_key(password, salt)?;
    Ok(constant_time_eq(derived.as_bytes(), expected_hash.as_bytes()))
}

/// Burns one derivation so rejections for unknown accounts cost as much as
/// rejections for wrong passwords.
pub fn dummy_password_check() {
    let mut key = [0u8; DERIVED_KEY_BYTES];
    pbkdf2_hmac::<Sha256>(b"placeholder-password", &[0u8; SALT_BYTES], KDF_ITERATIONS, &mut key);
}

fn derive_key(password: &str, salt_b64: &str) -> anyhow::Result<String> {
    let salt = BASE64
        .decode(salt_b64)
        .map_err(|e| anyhow::anyhow!("Invalid password salt: {}", e))?;
    let mut key = [0u8; DERIVED_KEY_BYTES];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, KDF_ITERATIONS, &mut key);
    Ok(BASE64.encode(key))
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
