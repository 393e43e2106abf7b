use rabe_bn::Fr;
use sha3::{
    Digest,
    Keccak256,
    Sha3_256
};
use crate::error::MpeckError;

/// Width in bytes of the canonical keyword encoding.
pub const KEYWORD_WIDTH: usize = 32;

/// Encodes a keyword into its canonical fixed-width form: one length byte followed by the UTF-8 bytes, zero padded.
///
/// The length prefix keeps the encoding injective, so `"a"` and `"a\0"` never collide.
pub fn encode_keyword(keyword: &str) -> Result<[u8; KEYWORD_WIDTH], MpeckError> {
    let bytes = keyword.as_bytes();
    if bytes.is_empty() {
        return Err(MpeckError::Encoding(String::from("empty keyword")));
    }
    if bytes.len() > KEYWORD_WIDTH - 1 {
        return Err(MpeckError::Encoding(format!(
            "keyword {} exceeds {} bytes",
            keyword,
            KEYWORD_WIDTH - 1
        )));
    }
    let mut out = [0u8; KEYWORD_WIDTH];
    out[0] = bytes.len() as u8;
    out[1..=bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

/// Width in bytes of the secret that keys the keyword hashes.
pub const HASH_KEY_WIDTH: usize = 32;

/// Hash a byte slice to [`rabe-bn::Fr`] using SHA3-256, keyed with `key`
///
/// The key is absorbed before the data. SHA3 is not length-extendable, so a
/// fixed-width key prefix is a sound MAC.
pub fn sha3_hash_fr(key: &[u8; HASH_KEY_WIDTH], data: &[u8]) -> Result<Fr, MpeckError> {
    let mut hasher = Sha3_256::new();
    hasher.update(key);
    hasher.update(data);
    digest_to_fr(hasher.finalize().as_slice())
}

/// Hash a byte slice to [`rabe-bn::Fr`] using Keccak-256, keyed with `key`
pub fn keccak_hash_fr(key: &[u8; HASH_KEY_WIDTH], data: &[u8]) -> Result<Fr, MpeckError> {
    let mut hasher = Keccak256::new();
    hasher.update(key);
    hasher.update(data);
    digest_to_fr(hasher.finalize().as_slice())
}

// the BN254 group order is larger than 2^253, so clearing the top three
// bits always yields a member of Fr
fn digest_to_fr(digest: &[u8]) -> Result<Fr, MpeckError> {
    let mut bytes: [u8; 32] = digest.try_into()?;
    bytes[0] &= 0x1f;
    Fr::from_slice(&bytes).map_err(|e| e.into())
}
