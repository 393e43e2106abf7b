//! This is the documentation for all rmpeck utils
//!
//! Currently those are:
//! aes
//! hash
//! slots
//!
pub mod aes;
pub mod hash;
pub mod slots;
