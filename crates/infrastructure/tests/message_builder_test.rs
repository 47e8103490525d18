use dsboot_domain::{DnsQuery, DomainName, RecordType};
use dsboot_infrastructure::dns::forwarding::{MessageBuilder, QueryFlags};

mod helpers;
use helpers::{parse_query, TYPE_DS};

fn query(name: &str, record_type: RecordType) -> DnsQuery {
    DnsQuery::new(DomainName::parse(name).unwrap(), record_type)
}

#[test]
fn test_query_carries_question_and_id() {
    let (id, bytes) =
        MessageBuilder::build_query(&query("Example.Test.", RecordType::DS), QueryFlags::default())
            .unwrap();

    let parsed = parse_query(&bytes, false);
    assert_eq!(parsed.id, id);
    assert_eq!(parsed.name, "example.test.");
    assert_eq!(parsed.qtype, TYPE_DS);
}

#[test]
fn test_query_requests_validation() {
    let (_, bytes) =
        MessageBuilder::build_query(&query("example.test.", RecordType::CDS), QueryFlags::default())
            .unwrap();

    let parsed = parse_query(&bytes, false);
    assert!(parsed.recursion_desired, "RD flag should be set");
    assert!(parsed.authentic_data, "AD flag should be set");
    assert!(!parsed.checking_disabled);
    assert_eq!(parsed.edns, Some((1232, true)), "EDNS with DO expected");
}

#[test]
fn test_checking_disabled_and_payload_follow_flags() {
    let flags = QueryFlags {
        edns_payload: 4096,
        checking_disabled: true,
        ..QueryFlags::default()
    };
    let (_, bytes) =
        MessageBuilder::build_query(&query("example.test.", RecordType::DNSKEY), flags).unwrap();

    let parsed = parse_query(&bytes, false);
    assert!(parsed.checking_disabled);
    assert_eq!(parsed.edns, Some((4096, true)));
}

#[test]
fn test_authoritative_query_does_not_recurse() {
    let (_, bytes) = MessageBuilder::build_query(
        &query("example.test.", RecordType::CDS),
        QueryFlags::authoritative(1232),
    )
    .unwrap();

    let parsed = parse_query(&bytes, false);
    assert!(!parsed.recursion_desired);
    assert!(!parsed.checking_disabled);
    assert_eq!(parsed.edns, Some((1232, true)));
}

#[test]
fn test_query_ids_vary() {
    let ids: std::collections::HashSet<u16> = (0..50)
        .map(|_| {
            MessageBuilder::build_query(&query("test.", RecordType::NS), QueryFlags::default())
                .unwrap()
                .0
        })
        .collect();
    assert!(ids.len() > 1, "query ids should be randomized");
}
