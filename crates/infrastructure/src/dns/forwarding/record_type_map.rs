use dsboot_domain::RecordType;
use hickory_proto::rr::RecordType as HickoryRecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Convert domain RecordType → hickory RecordType (for building queries)
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }

    /// Convert hickory RecordType → domain RecordType, `None` for types the
    /// pipeline does not model.
    pub fn from_hickory(record_type: HickoryRecordType) -> Option<RecordType> {
        RecordType::from_u16(u16::from(record_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dnssec_types_map_both_ways() {
        for (ours, theirs) in [
            (RecordType::DS, HickoryRecordType::DS),
            (RecordType::CDS, HickoryRecordType::CDS),
            (RecordType::DNSKEY, HickoryRecordType::DNSKEY),
            (RecordType::RRSIG, HickoryRecordType::RRSIG),
            (RecordType::NSEC, HickoryRecordType::NSEC),
            (RecordType::NS, HickoryRecordType::NS),
        ] {
            assert_eq!(RecordTypeMapper::to_hickory(ours), theirs);
            assert_eq!(RecordTypeMapper::from_hickory(theirs), Some(ours));
        }
        assert_eq!(RecordTypeMapper::from_hickory(HickoryRecordType::TXT), None);
    }
}
