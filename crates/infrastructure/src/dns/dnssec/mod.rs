//! Local DNSSEC cryptography.
//!
//! The upstream resolver validates the chain of trust and reports it with
//! the AD bit. What it cannot tell us is which individual key signed the
//! child's DNSKEY RRset, so that is checked here with `ring`.

pub mod crypto;

pub use crypto::{signed_data, RingDnssecVerifier};
