//! This is the documentation for all rmpeck schemes
//!
//! Currently those are:
//! * MPECK multi-user public-key encryption with conjunctive keyword search
//!
pub mod mpeck;
