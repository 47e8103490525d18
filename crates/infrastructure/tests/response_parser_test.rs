use dsboot_domain::{DnsQuery, DomainName, DsData, RecordType};
use dsboot_infrastructure::dns::forwarding::{MessageBuilder, QueryFlags, ResponseParser};

mod helpers;
use helpers::{encode_reply, Reply, WireRecord, RCODE_NXDOMAIN, RCODE_SERVFAIL};

fn name(s: &str) -> DomainName {
    DomainName::parse(s).unwrap()
}

fn query_bytes(owner: &str, record_type: RecordType) -> Vec<u8> {
    let query = DnsQuery::new(name(owner), record_type);
    MessageBuilder::build_query(&query, QueryFlags::default())
        .unwrap()
        .1
}

#[test]
fn test_parses_authenticated_ds_answer() {
    let query = query_bytes("example.test.", RecordType::DS);
    let reply = Reply::answer(
        vec![
            WireRecord::ds("example.test.", 2371, 13, 2, &[0xab; 32]),
            WireRecord::ds("example.test.", 15, 8, 2, &[0x01; 32]),
        ],
        true,
    );

    let response = ResponseParser::parse(&encode_reply(&query, &reply)).unwrap();
    assert!(response.authenticated);
    assert!(!response.truncated);
    assert_eq!(response.answers.len(), 2);

    let answer = response.into_answer();
    let ds = answer.ds_set(&name("example.test."));
    assert!(ds.contains(&DsData::new(2371, 13, 2, vec![0xab; 32])));
    assert!(ds.contains(&DsData::new(15, 8, 2, vec![0x01; 32])));
}

#[test]
fn test_nsec_in_authority_is_kept() {
    let query = query_bytes("a._signal.ns1.example.", RecordType::NSEC);
    let reply = Reply {
        authenticated: true,
        authority: vec![WireRecord::nsec(
            "a._signal.ns1.example.",
            "b._signal.ns1.example.",
        )],
        ..Default::default()
    };

    let answer = ResponseParser::parse(&encode_reply(&query, &reply))
        .unwrap()
        .into_answer();
    let nsec = answer.nsec(&name("a._signal.ns1.example.")).unwrap();
    assert_eq!(nsec.next, name("b._signal.ns1.example."));
}

#[test]
fn test_nxdomain_and_servfail_are_classified() {
    let query = query_bytes("missing.test.", RecordType::NS);

    let nx = ResponseParser::parse(&encode_reply(&query, &Reply::rcode(RCODE_NXDOMAIN))).unwrap();
    assert!(nx.is_nxdomain());
    assert!(!nx.is_error());
    assert!(nx.into_answer().nxdomain);

    let fail =
        ResponseParser::parse(&encode_reply(&query, &Reply::rcode(RCODE_SERVFAIL))).unwrap();
    assert!(fail.is_server_failure());
    assert!(fail.is_error());
}

#[test]
fn test_truncated_flag_is_reported() {
    let query = query_bytes("example.test.", RecordType::DNSKEY);
    let response = ResponseParser::parse(&encode_reply(&query, &Reply::truncated())).unwrap();
    assert!(response.truncated);
}

#[test]
fn test_garbage_is_rejected() {
    assert!(ResponseParser::parse(&[0x12, 0x34, 0x81]).is_err());
}
