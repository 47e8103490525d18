pub mod host_lookup;
pub mod resolv_conf;

pub use host_lookup::lookup_servers;
pub use resolv_conf::{parse_resolv_conf, system_nameservers};
