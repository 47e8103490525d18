#![allow(dead_code)]

pub mod fixtures;
pub mod mock_dns;

pub use fixtures::*;
pub use mock_dns::*;
