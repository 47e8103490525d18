//! Hand-encoded DNS messages, so the tests do not depend on the builder
//! API of the codec under test.

use dsboot_domain::DomainName;

pub const TYPE_A: u16 = 1;
pub const TYPE_NS: u16 = 2;
pub const TYPE_DS: u16 = 43;
pub const TYPE_NSEC: u16 = 47;
pub const TYPE_OPT: u16 = 41;

pub const RCODE_NOERROR: u8 = 0;
pub const RCODE_SERVFAIL: u8 = 2;
pub const RCODE_NXDOMAIN: u8 = 3;
pub const RCODE_REFUSED: u8 = 5;

/// What the mock server saw in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub id: u16,
    pub name: String,
    pub qtype: u16,
    pub recursion_desired: bool,
    pub authentic_data: bool,
    pub checking_disabled: bool,
    /// EDNS payload size and DO bit when an OPT record is present
    pub edns: Option<(u16, bool)>,
    pub over_tcp: bool,
}

#[derive(Debug, Clone)]
pub struct WireRecord {
    pub owner: String,
    pub rtype: u16,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl WireRecord {
    pub fn a(owner: &str, ip: std::net::Ipv4Addr) -> Self {
        Self {
            owner: owner.into(),
            rtype: TYPE_A,
            ttl: 3600,
            rdata: ip.octets().to_vec(),
        }
    }

    pub fn ns(owner: &str, target: &str) -> Self {
        Self {
            owner: owner.into(),
            rtype: TYPE_NS,
            ttl: 3600,
            rdata: name_wire(target),
        }
    }

    pub fn ds(owner: &str, key_tag: u16, algorithm: u8, digest_type: u8, digest: &[u8]) -> Self {
        let mut rdata = key_tag.to_be_bytes().to_vec();
        rdata.push(algorithm);
        rdata.push(digest_type);
        rdata.extend_from_slice(digest);
        Self {
            owner: owner.into(),
            rtype: TYPE_DS,
            ttl: 3600,
            rdata,
        }
    }

    /// NSEC with a bitmap window 0 covering NS (type 2) and RRSIG/NSEC.
    pub fn nsec(owner: &str, next: &str) -> Self {
        let mut rdata = name_wire(next);
        rdata.extend_from_slice(&[0, 6, 0x20, 0, 0, 0, 0, 0x03]);
        Self {
            owner: owner.into(),
            rtype: TYPE_NSEC,
            ttl: 3600,
            rdata,
        }
    }
}

/// Scripted reply to one query.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub rcode: u8,
    pub authenticated: bool,
    pub truncated: bool,
    pub answers: Vec<WireRecord>,
    pub authority: Vec<WireRecord>,
    /// Overrides the echoed query id
    pub id: Option<u16>,
    /// Drop the query without answering
    pub silent: bool,
}

impl Reply {
    pub fn answer(records: Vec<WireRecord>, authenticated: bool) -> Self {
        Self {
            authenticated,
            answers: records,
            ..Default::default()
        }
    }

    pub fn rcode(rcode: u8) -> Self {
        Self {
            rcode,
            ..Default::default()
        }
    }

    pub fn truncated() -> Self {
        Self {
            truncated: true,
            ..Default::default()
        }
    }

    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Default::default()
        }
    }
}

pub fn name_wire(name: &str) -> Vec<u8> {
    DomainName::parse(name).unwrap().to_wire()
}

/// Reads an uncompressed name starting at `offset`, returning it and the
/// offset just past it.
fn read_name(bytes: &[u8], mut offset: usize) -> (String, usize) {
    let mut labels = Vec::new();
    loop {
        let len = bytes[offset] as usize;
        offset += 1;
        if len == 0 {
            break;
        }
        labels.push(String::from_utf8_lossy(&bytes[offset..offset + len]).into_owned());
        offset += len;
    }
    let name = if labels.is_empty() {
        ".".to_string()
    } else {
        format!("{}.", labels.join("."))
    };
    (name, offset)
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

/// Parses a single-question query as produced by the resolver, including
/// its OPT record.
pub fn parse_query(bytes: &[u8], over_tcp: bool) -> ParsedQuery {
    let id = u16_at(bytes, 0);
    let (name, after_name) = read_name(bytes, 12);
    let qtype = u16_at(bytes, after_name);
    let question_end = after_name + 4;

    let arcount = u16_at(bytes, 10);
    let edns = if arcount > 0 && bytes.len() >= question_end + 11 {
        let opt = &bytes[question_end..];
        if opt[0] == 0 && u16_at(opt, 1) == TYPE_OPT {
            Some((u16_at(opt, 3), opt[7] & 0x80 != 0))
        } else {
            None
        }
    } else {
        None
    };

    ParsedQuery {
        id,
        name,
        qtype,
        recursion_desired: bytes[2] & 0x01 != 0,
        authentic_data: bytes[3] & 0x20 != 0,
        checking_disabled: bytes[3] & 0x10 != 0,
        edns,
        over_tcp,
    }
}

/// Encodes `reply` as the response to `query`, echoing its question.
pub fn encode_reply(query: &[u8], reply: &Reply) -> Vec<u8> {
    let (_, after_name) = read_name(query, 12);
    let question = &query[12..after_name + 4];
    let id = reply.id.unwrap_or_else(|| u16_at(query, 0));

    let mut out = Vec::with_capacity(512);
    out.extend_from_slice(&id.to_be_bytes());

    // QR, opcode QUERY, TC, RD echoed
    let mut flags_hi = 0x80 | (query[2] & 0x01);
    if reply.truncated {
        flags_hi |= 0x02;
    }
    // RA, AD, CD echoed, rcode
    let mut flags_lo = 0x80 | (query[3] & 0x10) | (reply.rcode & 0x0f);
    if reply.authenticated {
        flags_lo |= 0x20;
    }
    out.push(flags_hi);
    out.push(flags_lo);

    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&(reply.answers.len() as u16).to_be_bytes());
    out.extend_from_slice(&(reply.authority.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(question);

    for record in reply.answers.iter().chain(&reply.authority) {
        out.extend_from_slice(&name_wire(&record.owner));
        out.extend_from_slice(&record.rtype.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&record.ttl.to_be_bytes());
        out.extend_from_slice(&(record.rdata.len() as u16).to_be_bytes());
        out.extend_from_slice(&record.rdata);
    }
    out
}
