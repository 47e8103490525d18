pub mod dnssec;
pub mod forwarding;
pub mod resolver;
pub mod transport;

pub use dnssec::RingDnssecVerifier;
pub use resolver::{ResolverOptions, UpstreamResolver};
