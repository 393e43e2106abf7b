use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm,
    Key,
    Nonce,
    Tag
};
use rabe_bn::Gt;
use rand::Rng;
use sha3::{
    Digest,
    Sha3_256
};
use crate::error::MpeckError;
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// AES-256-GCM nonce length in bytes (96 bit)
pub const NONCE_LEN: usize = 12;
/// AES-256-GCM tag length in bytes (128 bit)
pub const TAG_LEN: usize = 16;

/// A document body sealed with AES-256-GCM: ciphertext, detached tag and the nonce it was sealed under.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SealedPayload {
    pub ct: Vec<u8>,
    pub tag: Vec<u8>,
    pub nonce: Vec<u8>,
}

/// Key Encapsulation Mechanism (Encryption Function)
///
/// Derives a 256 bit key from the pairing value `_msg` and seals `_plaintext` under it.
pub fn encrypt_symmetric(_msg: &Gt, _plaintext: &[u8]) -> Result<SealedPayload, MpeckError> {
    seal(&kdf(_msg), _plaintext)
}

/// Key Encapsulation Mechanism (Decryption Function)
pub fn decrypt_symmetric(_msg: &Gt, _sealed: &SealedPayload) -> Result<Vec<u8>, MpeckError> {
    open(&kdf(_msg), _sealed)
}

/// Seals `plaintext` under `key` with a fresh random nonce.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<SealedPayload, MpeckError> {
    let mut rng = rand::thread_rng();
    let nonce: [u8; NONCE_LEN] = rng.gen();
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut buffer = plaintext.to_vec();
    let tag = cipher.encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)?;
    Ok(SealedPayload {
        ct: buffer,
        tag: tag.to_vec(),
        nonce: nonce.to_vec(),
    })
}

/// Opens a sealed payload. Nothing of the plaintext is returned unless the tag verifies.
pub fn open(key: &[u8; 32], sealed: &SealedPayload) -> Result<Vec<u8>, MpeckError> {
    if sealed.nonce.len() != NONCE_LEN || sealed.tag.len() != TAG_LEN {
        return Err(MpeckError::Authentication);
    }
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut buffer = sealed.ct.clone();
    match cipher.decrypt_in_place_detached(
        Nonce::from_slice(&sealed.nonce),
        b"",
        &mut buffer,
        Tag::from_slice(&sealed.tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(e) => Err(e.into())
    }
}

/// 256 bit key hashed/derived from a pairing value
pub fn kdf(inp: &Gt) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(inp.to_string().as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(hasher.finalize().as_slice());
    key
}

#[cfg(test)]
mod tests {

    use super::*;
    use rabe_bn::{pairing, Fr, G1, G2};

    #[test]
    fn seal_open() {
        let key = [7u8; 32];
        let plaintext = String::from("dance like no one's watching, encrypt like everyone is!").into_bytes();
        let sealed = seal(&key, &plaintext).unwrap();
        assert_eq!(sealed.nonce.len(), NONCE_LEN);
        assert_eq!(sealed.tag.len(), TAG_LEN);
        assert_ne!(sealed.ct, plaintext);
        assert_eq!(open(&key, &sealed).unwrap(), plaintext);
    }

    #[test]
    fn tampering() {
        let key = [7u8; 32];
        let mut sealed = seal(&key, b"I have no money!").unwrap();
        assert_eq!(open(&[8u8; 32], &sealed), Err(MpeckError::Authentication));
        sealed.ct[0] ^= 1;
        assert_eq!(open(&key, &sealed), Err(MpeckError::Authentication));
        sealed.ct[0] ^= 1;
        sealed.tag.pop();
        assert_eq!(open(&key, &sealed), Err(MpeckError::Authentication));
    }

    #[test]
    fn gt_kem() {
        let mut rng = rand::thread_rng();
        let g1: G1 = rng.gen();
        let g2: G2 = rng.gen();
        let s: Fr = rng.gen();
        let msg = pairing(g1, g2).pow(s);
        let sealed = encrypt_symmetric(&msg, b"our plaintext!").unwrap();
        assert_eq!(decrypt_symmetric(&msg, &sealed).unwrap(), b"our plaintext!".to_vec());
        let other = pairing(g1, g2);
        assert!(decrypt_symmetric(&other, &sealed).is_err());
        assert_eq!(kdf(&msg), kdf(&msg));
    }
}
