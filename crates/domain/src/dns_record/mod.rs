pub mod rdata;
pub mod record;
pub mod record_type;

pub use rdata::{DnskeyData, DsData, NsecData, RecordData, RrsigData};
pub use record::ResourceRecord;
pub use record_type::RecordType;
