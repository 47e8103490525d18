use dsboot_domain::{DnskeyData, DomainError, DomainName, DsData, RrsigData};

/// DNSSEC primitives, invoked per key rather than trusting the RRset-level
/// AD flag alone.
pub trait DnssecVerifier: Send + Sync {
    /// True when `rrsig` over the DNSKEY RRset of `zone` verifies with `key`
    /// and is inside its validity window.
    fn verify_dnskey_rrset(
        &self,
        zone: &DomainName,
        rrset: &[DnskeyData],
        rrsig: &RrsigData,
        key: &DnskeyData,
    ) -> Result<bool, DomainError>;

    /// True when `ds` (a DS or CDS entry) is a digest of `key`.
    fn digest_matches(
        &self,
        zone: &DomainName,
        ds: &DsData,
        key: &DnskeyData,
    ) -> Result<bool, DomainError>;
}
