use dsboot_application::ports::DnssecVerifier;
use dsboot_domain::{DnskeyData, DomainError, DomainName, DsData, RrsigData};
use ring::signature::{self, UnparsedPublicKey, VerificationAlgorithm};
use sha2::{Digest, Sha256, Sha384};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const CLASS_IN: u16 = 1;

/// DNSSEC signature and digest checks backed by `ring` and `sha2`.
///
/// Supported signing algorithms: RSASHA256 (8), RSASHA512 (10),
/// ECDSAP256SHA256 (13), ECDSAP384SHA384 (14) and ED25519 (15).
/// Supported digest types: SHA-256 (2) and SHA-384 (4).
#[derive(Debug, Clone, Copy, Default)]
pub struct RingDnssecVerifier;

impl RingDnssecVerifier {
    pub fn new() -> Self {
        Self
    }

    fn now() -> u32 {
        let unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        RrsigData::serial_time(unix_secs)
    }

    fn verify_signature(
        algorithm: u8,
        public_key: &[u8],
        data: &[u8],
        sig: &[u8],
    ) -> Result<bool, DomainError> {
        match algorithm {
            8 => Self::verify_rsa(
                &signature::RSA_PKCS1_2048_8192_SHA256,
                public_key,
                data,
                sig,
            ),
            10 => Self::verify_rsa(
                &signature::RSA_PKCS1_2048_8192_SHA512,
                public_key,
                data,
                sig,
            ),
            13 => Self::verify_ecdsa(
                &signature::ECDSA_P256_SHA256_FIXED,
                64,
                public_key,
                data,
                sig,
            ),
            14 => Self::verify_ecdsa(
                &signature::ECDSA_P384_SHA384_FIXED,
                96,
                public_key,
                data,
                sig,
            ),
            15 => {
                if public_key.len() != 32 {
                    return Err(DomainError::InvalidRecordData {
                        record_type: "DNSKEY".into(),
                        reason: "Ed25519 public key must be 32 bytes".into(),
                    });
                }
                let key = UnparsedPublicKey::new(&signature::ED25519, public_key);
                Ok(key.verify(data, sig).is_ok())
            }
            other => Err(DomainError::UnsupportedAlgorithm(other)),
        }
    }

    fn verify_rsa(
        params: &'static signature::RsaParameters,
        public_key: &[u8],
        data: &[u8],
        sig: &[u8],
    ) -> Result<bool, DomainError> {
        let (exponent, modulus) = parse_rsa_key(public_key)?;
        let components = signature::RsaPublicKeyComponents {
            n: modulus,
            e: exponent,
        };
        Ok(components.verify(params, data, sig).is_ok())
    }

    /// DNSSEC carries the bare X || Y point; ring wants the SEC1
    /// uncompressed form with its 0x04 tag.
    fn verify_ecdsa(
        params: &'static dyn VerificationAlgorithm,
        point_len: usize,
        public_key: &[u8],
        data: &[u8],
        sig: &[u8],
    ) -> Result<bool, DomainError> {
        if public_key.len() != point_len {
            return Err(DomainError::InvalidRecordData {
                record_type: "DNSKEY".into(),
                reason: format!("ECDSA public key must be {} bytes", point_len),
            });
        }
        let mut sec1 = Vec::with_capacity(point_len + 1);
        sec1.push(0x04);
        sec1.extend_from_slice(public_key);
        let key = UnparsedPublicKey::new(params, sec1);
        Ok(key.verify(data, sig).is_ok())
    }
}

impl DnssecVerifier for RingDnssecVerifier {
    fn verify_dnskey_rrset(
        &self,
        zone: &DomainName,
        rrset: &[DnskeyData],
        rrsig: &RrsigData,
        key: &DnskeyData,
    ) -> Result<bool, DomainError> {
        if rrsig.algorithm != key.algorithm || rrsig.key_tag != key.key_tag() {
            return Ok(false);
        }
        if rrsig.signer != *zone {
            return Ok(false);
        }
        if !rrsig.is_current(Self::now()) {
            debug!(
                zone = %zone,
                key_tag = rrsig.key_tag,
                "RRSIG outside its validity window"
            );
            return Ok(false);
        }

        let rdatas = rrset.iter().map(DnskeyData::to_wire).collect();
        let data = signed_data(zone, rrsig, rdatas)?;
        Self::verify_signature(key.algorithm, &key.public_key, &data, &rrsig.signature)
    }

    fn digest_matches(
        &self,
        zone: &DomainName,
        ds: &DsData,
        key: &DnskeyData,
    ) -> Result<bool, DomainError> {
        if ds.algorithm != key.algorithm || ds.key_tag != key.key_tag() {
            return Ok(false);
        }

        // RFC 4034 section 5.1.4: digest = H(owner name | DNSKEY RDATA)
        let mut input = zone.to_wire();
        input.extend_from_slice(&key.to_wire());

        let computed = match ds.digest_type {
            2 => Sha256::digest(&input).to_vec(),
            4 => Sha384::digest(&input).to_vec(),
            other => return Err(DomainError::UnsupportedDigestType(other)),
        };
        Ok(computed == ds.digest)
    }
}

/// Data covered by an RRSIG (RFC 4034 section 3.1.8.1): the RRSIG RDATA
/// without the signature, then every RR of the set in canonical order.
pub fn signed_data(
    owner: &DomainName,
    rrsig: &RrsigData,
    mut rdatas: Vec<Vec<u8>>,
) -> Result<Vec<u8>, DomainError> {
    let owner_wire = signed_owner(owner, rrsig.labels)?.to_wire();

    rdatas.sort();
    rdatas.dedup();

    let mut data = rrsig.signed_prefix();
    for rdata in &rdatas {
        let rdlength = u16::try_from(rdata.len()).map_err(|_| DomainError::InvalidRecordData {
            record_type: "RRSIG".into(),
            reason: "record data exceeds 65535 bytes".into(),
        })?;
        data.extend_from_slice(&owner_wire);
        data.extend_from_slice(&rrsig.type_covered.to_be_bytes());
        data.extend_from_slice(&CLASS_IN.to_be_bytes());
        data.extend_from_slice(&rrsig.original_ttl.to_be_bytes());
        data.extend_from_slice(&rdlength.to_be_bytes());
        data.extend_from_slice(rdata);
    }
    Ok(data)
}

/// Owner as signed: a wildcard expansion is signed under `*.<closest
/// encloser>`, recognizable by the RRSIG labels field.
fn signed_owner(owner: &DomainName, labels: u8) -> Result<DomainName, DomainError> {
    let owner_labels = owner.labels();
    let labels = labels as usize;
    if labels >= owner_labels.len() {
        return Ok(owner.clone());
    }
    let mut wildcard = vec!["*"];
    wildcard.extend_from_slice(&owner_labels[owner_labels.len() - labels..]);
    DomainName::from_labels(wildcard)
}

/// RFC 3110 public key layout: exponent length (one octet, or zero plus
/// two octets), exponent, modulus.
fn parse_rsa_key(key_data: &[u8]) -> Result<(&[u8], &[u8]), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidRecordData {
        record_type: "DNSKEY".into(),
        reason: reason.to_string(),
    };

    let (exp_len, exp_start) = match key_data {
        [] => return Err(invalid("empty RSA public key")),
        [0, hi, lo, ..] => (u16::from_be_bytes([*hi, *lo]) as usize, 3),
        [0, ..] => return Err(invalid("RSA key too short for long exponent form")),
        [len, ..] => (*len as usize, 1),
    };

    let exp_end = exp_start + exp_len;
    if exp_end >= key_data.len() {
        return Err(invalid("RSA exponent leaves no room for the modulus"));
    }
    Ok((&key_data[exp_start..exp_end], &key_data[exp_end..]))
}
