pub mod dns;
pub mod parental;
pub mod system;
