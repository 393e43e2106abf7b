//! `MPECK` multi-user public-key encryption with conjunctive keyword search.
//!
//! * Following Hwang, Lee, "Public Key Encryption with Conjunctive Keyword Search and Its Extension to a Multi-user System"
//! * Published in Pairing-Based Cryptography, Pairing 2007
//! * Type: searchable encryption (conjunctive keywords, multi-user)
//! * Setting: bilinear groups (asymmetric)
//!
//! A document is committed to one group element per keyword slot. Readers
//! whose public key was authorized at encoding time can hand a server a
//! trapdoor for a conjunction of keywords; the server tests it against the
//! stored documents without learning the keywords.
//!
//! Keyword hashes are keyed with a secret shared by the scheme's key holders.
//! The server only ever sees public keys, documents and trapdoors, so it
//! cannot recompute the hash of a guessed keyword or placeholder and check it
//! against a slot.
//!
//! # Examples
//!
//! ```
//! use rmpeck::schemes::mpeck::*;
//! use rmpeck::utils::slots::KeywordIndex;
//! let scheme = Mpeck::setup();
//! let index = KeywordIndex::new();
//! index.add("tax-returns").unwrap();
//! let key = scheme.keygen();
//! let slots = index.expand(&["tax-returns"]).unwrap();
//! let (ct, doc) = scheme.encode(&index, &[key.pk.clone()], &slots, b"our plaintext!").unwrap();
//! let td = scheme.trapdoor(&key.sk, &index.query(&["tax-returns"]).unwrap()).unwrap();
//! assert!(test(key.pk.index, &doc, &td));
//! let plaintext = scheme.decrypt(&key.sk, &ct, &doc.a, &doc.b_hat[&key.pk.index]).unwrap();
//! assert_eq!(plaintext, b"our plaintext!".to_vec());
//! ```
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering}
};
use rabe_bn::{Group, Fr, G1, G2, Gt, pairing};
use rand::Rng;
use tracing::{debug, trace};
use crate::{
    error::MpeckError,
    utils::{
        aes::*,
        hash::{encode_keyword, keccak_hash_fr, sha3_hash_fr, HASH_KEY_WIDTH},
        slots::KeywordIndex
    }
};
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// A MPECK Public Key together with the index that addresses its share in a document
///
/// `key_hat` is the G1 twin of `key`, the encoder derives the reader's decryption share from it.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MpeckPublicKey {
    pub key: G2,
    pub key_hat: G1,
    pub index: usize,
}

/// A MPECK Key Pair (PK, SK)
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MpeckKeyPair {
    pub pk: MpeckPublicKey,
    pub sk: Fr,
}

/// A MPECK encoded document (A, B, B̂, C)
///
/// `b` feeds the test equation, `b_hat` holds the same per-reader shares in G1 for decryption.
/// Nothing in a document exposes `r` in G1.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MpeckDocument {
    pub a: G2,
    pub b: BTreeMap<usize, G2>,
    pub b_hat: BTreeMap<usize, G1>,
    pub c: Vec<G1>,
}

impl MpeckDocument {
    /// The B-entry of the reader with key index `index`, if that reader was authorized.
    pub fn share(&self, index: usize) -> Option<G2> {
        self.b.get(&index).copied()
    }

    /// The B̂-entry (decryption share) of the reader with key index `index`.
    pub fn share_hat(&self, index: usize) -> Option<G1> {
        self.b_hat.get(&index).copied()
    }

    /// Number of keyword slots the document was encoded with.
    pub fn slots(&self) -> usize {
        self.c.len()
    }
}

/// A MPECK Trapdoor (T1, T2, T3, I) for a conjunction of keywords
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MpeckTrapdoor {
    pub t1: G2,
    pub t2: G1,
    pub t3: G1,
    pub slots: Vec<usize>,
}

/// A MPECK scheme instance: the public generators, the keyword hash key and the key counter.
///
/// Held by key holders only. The server needs none of it, see [`test`].
pub struct Mpeck {
    g1: G1,
    g2: G2,
    e_gg: Gt,
    keyword_key: [u8; HASH_KEY_WIDTH],
    key_count: AtomicUsize,
}

impl std::fmt::Debug for Mpeck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mpeck")
            .field("g1", &self.g1)
            .field("g2", &self.g2)
            .field("key_count", &self.key_count)
            .finish_non_exhaustive()
    }
}

impl Mpeck {
    /// The setup algorithm of MPECK. Draws the generators of G1 and G2 and the keyword hash key.
    pub fn setup() -> Mpeck {
        // random number generator
        let mut _rng = rand::thread_rng();
        let _g1: G1 = _rng.gen();
        let _g2: G2 = _rng.gen();
        Mpeck::from_generators(_g1, _g2)
    }

    /// Builds a scheme instance from known generators and a fresh keyword hash key.
    pub fn from_generators(g1: G1, g2: G2) -> Mpeck {
        // random number generator
        let mut _rng = rand::thread_rng();
        Mpeck::from_parts(g1, g2, _rng.gen())
    }

    /// Restores a scheme instance shared by several key holders.
    pub fn from_parts(g1: G1, g2: G2, keyword_key: [u8; HASH_KEY_WIDTH]) -> Mpeck {
        Mpeck {
            g1,
            g2,
            e_gg: pairing(g1, g2),
            keyword_key,
            key_count: AtomicUsize::new(0),
        }
    }

    /// The secret keying H1 and H2. Every key holder needs it, the server must never get it.
    pub fn keyword_key(&self) -> &[u8; HASH_KEY_WIDTH] {
        &self.keyword_key
    }

    pub fn g1(&self) -> G1 {
        self.g1
    }

    pub fn g2(&self) -> G2 {
        self.g2
    }

    /// Number of key pairs issued so far.
    pub fn key_count(&self) -> usize {
        self.key_count.load(Ordering::SeqCst)
    }

    /// H1: keyword to G1 through keyed Keccak-256 over the canonical keyword encoding
    pub fn h1(&self, keyword: &str) -> Result<G1, MpeckError> {
        Ok(self.g1 * keccak_hash_fr(&self.keyword_key, &encode_keyword(keyword)?)?)
    }

    /// H2: keyword to G1 through keyed SHA3-256 over the canonical keyword encoding
    pub fn h2(&self, keyword: &str) -> Result<G1, MpeckError> {
        Ok(self.g1 * sha3_hash_fr(&self.keyword_key, &encode_keyword(keyword)?)?)
    }

    /// The key generation algorithm of MPECK. Generates a key pair with the next free index.
    pub fn keygen(&self) -> MpeckKeyPair {
        // random number generator
        let mut _rng = rand::thread_rng();
        let _x: Fr = _rng.gen();
        let index = self.key_count.fetch_add(1, Ordering::SeqCst);
        debug!(index, "issued key pair");
        MpeckKeyPair {
            pk: MpeckPublicKey {
                key: self.g2 * _x,
                key_hat: self.g1 * _x,
                index,
            },
            sk: _x,
        }
    }

    /// The encode (add document) algorithm of MPECK.
    ///
    /// # Arguments
    ///
    ///	* `index` - The keyword index the slot sequence was expanded from
    ///	* `authorized` - The public keys allowed to search and decrypt the document
    ///	* `slots` - One keyword or placeholder per slot, see [`KeywordIndex::expand`]
    ///	* `plaintext` - The document body
    ///
    pub fn encode<S: AsRef<str>>(
        &self,
        index: &KeywordIndex,
        authorized: &[MpeckPublicKey],
        slots: &[S],
        plaintext: &[u8],
    ) -> Result<(SealedPayload, MpeckDocument), MpeckError> {
        if authorized.is_empty() {
            return Err(MpeckError::NoRecipients);
        }
        let expected = index.total_slots()?;
        if slots.len() != expected {
            return Err(MpeckError::MismatchedSlotCount {
                expected,
                actual: slots.len(),
            });
        }
        for pk in authorized {
            if pairing(pk.key_hat, self.g2) != pairing(self.g1, pk.key) {
                return Err(MpeckError::InvalidKey);
            }
        }
        // random number generator
        let mut _rng = rand::thread_rng();
        let _r: Fr = _rng.gen();
        let _s: Fr = _rng.gen();
        let b: BTreeMap<usize, G2> = authorized
            .iter()
            .map(|pk| (pk.index, pk.key * _s))
            .collect();
        let b_hat: BTreeMap<usize, G1> = authorized
            .iter()
            .map(|pk| (pk.index, pk.key_hat * _s))
            .collect();
        // placeholders are committed exactly like keywords
        let c = slots
            .iter()
            .map(|slot| {
                let keyword = slot.as_ref();
                Ok(self.h1(keyword)? * _r + self.h2(keyword)? * _s)
            })
            .collect::<Result<Vec<G1>, MpeckError>>()?;
        //Encrypt plaintext using derived key from secret
        let ct = encrypt_symmetric(&self.e_gg.pow(_r * _s), plaintext)?;
        debug!(slots = c.len(), recipients = b.len(), "encoded document");
        Ok((
            ct,
            MpeckDocument {
                a: self.g2 * _r,
                b,
                b_hat,
                c,
            },
        ))
    }

    /// The trapdoor algorithm of MPECK. Generates a search token for the conjunction of all keywords in `query`.
    ///
    /// # Arguments
    ///
    ///	* `sk` - The secret key of the searching reader
    ///	* `query` - Keywords together with their slots, see [`KeywordIndex::query`]
    ///
    pub fn trapdoor(&self, sk: &Fr, query: &[(String, usize)]) -> Result<MpeckTrapdoor, MpeckError> {
        if query.is_empty() {
            return Err(MpeckError::EmptyQuery);
        }
        let _sk_inv = sk.inverse().ok_or(MpeckError::InvalidKey)?;
        // random number generator
        let mut _rng = rand::thread_rng();
        let _t: Fr = _rng.gen();
        // aggregate first, exponentiate once
        let mut _h1_sum = G1::zero();
        let mut _h2_sum = G1::zero();
        for (keyword, _) in query {
            _h1_sum = _h1_sum + self.h1(keyword)?;
            _h2_sum = _h2_sum + self.h2(keyword)?;
        }
        Ok(MpeckTrapdoor {
            t1: self.g2 * _t,
            t2: _h1_sum * _t,
            t3: _h2_sum * (_t * _sk_inv),
            slots: query.iter().map(|(_, slot)| *slot).collect(),
        })
    }

    /// Runs [`test`] on behalf of the reader with key index `reader`.
    pub fn test(&self, reader: usize, doc: &MpeckDocument, trapdoor: &MpeckTrapdoor) -> bool {
        test(reader, doc, trapdoor)
    }

    /// The decrypt algorithm of MPECK. Recovers the payload from the document's A and the reader's own B̂-entry.
    ///
    /// # Arguments
    ///
    ///	* `sk` - The secret key of the reader
    ///	* `ct` - The sealed payload
    ///	* `a` - The document's A
    ///	* `b_hat` - The reader's B̂-entry
    ///
    pub fn decrypt(&self, sk: &Fr, ct: &SealedPayload, a: &G2, b_hat: &G1) -> Result<Vec<u8>, MpeckError> {
        let _sk_inv = sk.inverse().ok_or(MpeckError::InvalidKey)?;
        let _msg = pairing(*b_hat, *a).pow(_sk_inv);
        // Decrypt plaintext using derived secret from mpeck scheme
        decrypt_symmetric(&_msg, ct)
    }
}

/// The test algorithm of MPECK. Returns true if `doc` contains every keyword of `trapdoor`
/// and the trapdoor was made by the reader with key index `reader`.
///
/// Needs no scheme parameters, so the server runs it without any secret.
/// Never fails: unknown readers and slots outside the document simply do not match.
pub fn test(reader: usize, doc: &MpeckDocument, trapdoor: &MpeckTrapdoor) -> bool {
    let _b = match doc.share(reader) {
        Some(b) => b,
        None => return false,
    };
    if trapdoor.slots.is_empty() {
        return false;
    }
    let mut _ci = G1::zero();
    for slot in trapdoor.slots.iter() {
        match doc.c.get(*slot) {
            Some(c) => _ci = _ci + *c,
            None => return false,
        }
    }
    let matched = pairing(_ci, trapdoor.t1)
        == pairing(trapdoor.t2, doc.a) * pairing(trapdoor.t3, _b);
    trace!(reader, matched, "tested trapdoor");
    matched
}
