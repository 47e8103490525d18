use dsboot_application::ports::{DnsResolver, NameserverQuery};
use dsboot_domain::{DnsQuery, DomainError, DomainName, RecordType};
use dsboot_infrastructure::dns::{ResolverOptions, UpstreamResolver};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod helpers;
use helpers::{
    MockDnsServer, Reply, WireRecord, RCODE_REFUSED, RCODE_SERVFAIL, TYPE_A, TYPE_NS,
};

fn name(s: &str) -> DomainName {
    DomainName::parse(s).unwrap()
}

fn resolver(servers: Vec<SocketAddr>, attempts: u32) -> UpstreamResolver {
    UpstreamResolver::new(ResolverOptions {
        servers,
        timeout: Duration::from_millis(300),
        attempts,
        edns_payload: 1232,
        authoritative_port: 53,
    })
    .unwrap()
}

fn ns_query(zone: &str) -> DnsQuery {
    DnsQuery::new(name(zone), RecordType::NS)
}

#[tokio::test]
async fn test_resolves_authenticated_answer() {
    let server = MockDnsServer::start(|q| {
        assert_eq!(q.qtype, TYPE_NS);
        Reply::answer(vec![WireRecord::ns(&q.name, "ns1.example.")], true)
    })
    .await;

    let answer = resolver(vec![server.addr()], 1)
        .resolve(&ns_query("example.test."))
        .await
        .unwrap();

    assert!(answer.authenticated);
    assert!(answer.ns_targets(&name("example.test.")).contains(&name("ns1.example.")));
}

#[tokio::test]
async fn test_servfail_with_working_cd_query_is_bogus() {
    let server = MockDnsServer::start(|q| {
        if q.checking_disabled {
            Reply::answer(vec![WireRecord::ns(&q.name, "ns1.example.")], false)
        } else {
            Reply::rcode(RCODE_SERVFAIL)
        }
    })
    .await;

    let err = resolver(vec![server.addr()], 1)
        .resolve(&ns_query("bogus.test."))
        .await
        .unwrap_err();

    assert!(err.is_bogus(), "expected bogus, got {:?}", err);
    assert!(server.queries().iter().any(|q| q.checking_disabled));
}

#[tokio::test]
async fn test_servfail_on_both_queries_is_indeterminate() {
    let server = MockDnsServer::start(|_| Reply::rcode(RCODE_SERVFAIL)).await;

    let err = resolver(vec![server.addr()], 1)
        .resolve(&ns_query("broken.test."))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Transport(_)), "{:?}", err);
    assert!(!err.is_bogus());
}

#[tokio::test]
async fn test_refused_is_a_transport_failure() {
    let server = MockDnsServer::start(|_| Reply::rcode(RCODE_REFUSED)).await;

    let err = resolver(vec![server.addr()], 1)
        .resolve(&ns_query("example.test."))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Transport(_)));
    // No CD re-query for anything but SERVFAIL
    assert_eq!(server.query_count(), 1);
}

#[tokio::test]
async fn test_truncated_udp_answer_retries_over_tcp() {
    let server = MockDnsServer::start(|q| {
        if q.over_tcp {
            Reply::answer(vec![WireRecord::ns(&q.name, "ns1.example.")], true)
        } else {
            Reply::truncated()
        }
    })
    .await;

    let answer = resolver(vec![server.addr()], 1)
        .resolve(&ns_query("big.test."))
        .await
        .unwrap();

    assert!(!answer.records.is_empty());
    let transports: Vec<bool> = server.queries().iter().map(|q| q.over_tcp).collect();
    assert_eq!(transports, vec![false, true]);
}

#[tokio::test]
async fn test_mismatched_id_is_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let server = MockDnsServer::start(move |q| {
        let mut reply = Reply::answer(vec![WireRecord::ns(&q.name, "ns1.example.")], true);
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            reply.id = Some(q.id.wrapping_add(1));
        }
        reply
    })
    .await;

    let answer = resolver(vec![server.addr()], 2)
        .resolve(&ns_query("example.test."))
        .await
        .unwrap();

    assert!(answer.authenticated);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_attempts_rotate_to_next_server() {
    let silent = MockDnsServer::start(|_| Reply::silent()).await;
    let healthy = MockDnsServer::start(|q| {
        Reply::answer(vec![WireRecord::ns(&q.name, "ns1.example.")], true)
    })
    .await;

    let answer = resolver(vec![silent.addr(), healthy.addr()], 2)
        .resolve(&ns_query("example.test."))
        .await
        .unwrap();

    assert!(answer.authenticated);
    assert_eq!(silent.query_count(), 1);
    assert_eq!(healthy.query_count(), 1);
}

#[tokio::test]
async fn test_exhausted_attempts_time_out() {
    let silent = MockDnsServer::start(|_| Reply::silent()).await;

    let err = resolver(vec![silent.addr()], 2)
        .resolve(&ns_query("example.test."))
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::QueryTimeout);
    assert_eq!(silent.query_count(), 2);
}

#[tokio::test]
async fn test_answer_larger_than_4k_fits_the_advertised_payload() {
    let server = MockDnsServer::start(|q| {
        let records = (0..80)
            .map(|i| {
                WireRecord::ns(
                    &q.name,
                    &format!("ns{:02}.a-rather-long-hosting-provider-name.example.", i),
                )
            })
            .collect();
        Reply::answer(records, true)
    })
    .await;

    let resolver = UpstreamResolver::new(ResolverOptions {
        servers: vec![server.addr()],
        timeout: Duration::from_millis(500),
        attempts: 1,
        edns_payload: 8192,
        authoritative_port: 53,
    })
    .unwrap();
    let answer = resolver.resolve(&ns_query("big.test.")).await.unwrap();

    assert_eq!(answer.ns_targets(&name("big.test.")).len(), 80);
    let queries = server.queries();
    assert_eq!(queries.len(), 1, "no TCP retry expected");
    assert!(!queries[0].over_tcp);
    assert_eq!(queries[0].edns, Some((8192, true)));
}

#[tokio::test]
async fn test_nameserver_is_queried_directly_without_recursion() {
    let authoritative = MockDnsServer::start(|q| {
        Reply::answer(vec![WireRecord::ns(&q.name, "ns1.example.")], false)
    })
    .await;
    let upstream = MockDnsServer::start(|q| {
        if q.qtype == TYPE_A {
            Reply::answer(vec![WireRecord::a(&q.name, Ipv4Addr::LOCALHOST)], true)
        } else {
            Reply::answer(vec![], true)
        }
    })
    .await;

    let resolver = UpstreamResolver::new(ResolverOptions {
        servers: vec![upstream.addr()],
        timeout: Duration::from_millis(300),
        attempts: 1,
        edns_payload: 1232,
        authoritative_port: authoritative.addr().port(),
    })
    .unwrap();
    let answer = resolver
        .query_nameserver(&name("ns1.example."), &ns_query("example.test."))
        .await
        .unwrap();

    assert!(answer.ns_targets(&name("example.test.")).contains(&name("ns1.example.")));
    let direct = authoritative.queries();
    assert_eq!(direct.len(), 1);
    assert!(!direct[0].recursion_desired);
    assert_eq!(direct[0].edns, Some((1232, true)));
    let lookups: Vec<(String, u16)> = upstream
        .queries()
        .into_iter()
        .map(|q| (q.name, q.qtype))
        .collect();
    assert_eq!(
        lookups,
        vec![("ns1.example.".to_string(), TYPE_A), ("ns1.example.".to_string(), 28)]
    );
}

#[tokio::test]
async fn test_nameserver_without_addresses_is_a_transport_error() {
    let upstream = MockDnsServer::start(|_| Reply::answer(vec![], true)).await;

    let err = resolver(vec![upstream.addr()], 1)
        .query_nameserver(&name("ns1.example."), &ns_query("example.test."))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Transport(_)), "{:?}", err);
}

#[test]
fn test_resolver_requires_a_server() {
    let result = UpstreamResolver::new(ResolverOptions {
        servers: vec![],
        timeout: Duration::from_secs(1),
        attempts: 1,
        edns_payload: 1232,
        authoritative_port: 53,
    });
    assert!(result.is_err());
}
