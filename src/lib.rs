//! This is the documentation for the `rmpeck` library.
//!
//! * Type: multi-user public-key encryption with conjunctive keyword search (MPECK)
//! * Setting: bilinear groups (asymmetric), BN254 via `rabe-bn`
//!
//! The crate is split into
//! * [`schemes::mpeck`]: key generation, document encoding, trapdoors, the test equation and decryption
//! * [`utils`]: the keyword hash mapper, the payload cipher and the keyword slot index
//! * [`roles`]: owners, consultants, clients and the untrusted server
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use rmpeck::{roles::{Person, Server}, schemes::mpeck::Mpeck, utils::slots::KeywordIndex};
//! let scheme = Arc::new(Mpeck::setup());
//! let keywords = Arc::new(KeywordIndex::new());
//! let server = Arc::new(Server::new());
//! let mut consultant = Person::consultant(scheme.clone(), keywords.clone(), server.clone());
//! let client = Person::client(scheme.clone(), keywords.clone(), server.clone(), consultant.public_key()).unwrap();
//! consultant.register_client("client", client.public_key().clone()).unwrap();
//! keywords.add("tax-returns").unwrap();
//! client.upload(b"I have no money!", &["tax-returns"]).unwrap();
//! assert_eq!(consultant.search(&["tax-returns"]).unwrap(), vec![b"I have no money!".to_vec()]);
//! ```
#[cfg(feature = "borsh")]
extern crate borsh;
#[cfg(feature = "serde")]
extern crate serde;

pub mod error;
pub mod roles;
pub mod schemes;
pub mod utils;

pub use error::MpeckError;
