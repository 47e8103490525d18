pub mod dns_ns_source;

pub use dns_ns_source::DnsParentalNsSource;
