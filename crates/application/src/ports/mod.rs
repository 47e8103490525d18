pub mod dns_resolver;
pub mod dnssec_verifier;
pub mod nameserver_query;
pub mod parental_ns_source;

pub use dns_resolver::{DnsAnswer, DnsResolver};
pub use dnssec_verifier::DnssecVerifier;
pub use nameserver_query::NameserverQuery;
pub use parental_ns_source::ParentalNsSource;
