use crate::{DomainError, DomainName};
use base32::Alphabet;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// How bootstrap signaling names are laid out below a nameserver hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalingScheme {
    /// `<child first label>.<H(parent)>._boot.<ns>`, with `H` the base32hex
    /// SHA-256 of the parent's wire form.
    #[default]
    DraftHashed,
    /// `_dsboot.<child>._signal.<ns>` (RFC 9615).
    Rfc9615,
}

const DRAFT_LABEL: &str = "_boot";
const RFC9615_PREFIX: &str = "_dsboot";
const RFC9615_LABEL: &str = "_signal";

impl SignalingScheme {
    /// Name under `nameserver` where the operator signals `child`.
    pub fn signal_name(
        &self,
        child: &DomainName,
        nameserver: &DomainName,
    ) -> Result<DomainName, DomainError> {
        match self {
            SignalingScheme::DraftHashed => {
                let first = child.first_label().ok_or_else(|| {
                    DomainError::InvalidDomainName("the root has no signaling name".into())
                })?;
                let parent = child.parent().unwrap_or_else(DomainName::root);
                let hash = signaling_hash(&parent);
                nameserver.prepend_all(&[first, &hash, DRAFT_LABEL])
            }
            SignalingScheme::Rfc9615 => {
                let mut labels = vec![RFC9615_PREFIX];
                labels.extend(child.labels());
                labels.push(RFC9615_LABEL);
                nameserver.prepend_all(&labels)
            }
        }
    }

    /// Apex of the subtree under `nameserver` that holds the signaling names
    /// of every child of `ancestor`.
    pub fn walk_apex(
        &self,
        ancestor: &DomainName,
        nameserver: &DomainName,
    ) -> Result<DomainName, DomainError> {
        match self {
            SignalingScheme::DraftHashed => {
                let hash = signaling_hash(ancestor);
                nameserver.prepend_all(&[&hash, DRAFT_LABEL])
            }
            SignalingScheme::Rfc9615 => {
                let mut labels = ancestor.labels();
                labels.push(RFC9615_LABEL);
                nameserver.prepend_all(&labels)
            }
        }
    }

    /// Maps an owner name found while walking below `apex` to the child of
    /// `ancestor` it signals: the label immediately below the apex.
    pub fn candidate_from_owner(
        &self,
        owner: &DomainName,
        apex: &DomainName,
        ancestor: &DomainName,
    ) -> Option<DomainName> {
        let relative = owner.relative_to(apex)?;
        let label = relative.last()?;
        if *label == RFC9615_PREFIX {
            return None;
        }
        ancestor.prepend(label).ok()
    }
}

impl fmt::Display for SignalingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalingScheme::DraftHashed => f.write_str("draft-hashed"),
            SignalingScheme::Rfc9615 => f.write_str("rfc9615"),
        }
    }
}

impl FromStr for SignalingScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft-hashed" => Ok(SignalingScheme::DraftHashed),
            "rfc9615" => Ok(SignalingScheme::Rfc9615),
            other => Err(format!("unknown signaling scheme: {}", other)),
        }
    }
}

/// Lowercase, unpadded base32hex of SHA-256 over the name's wire form.
pub fn signaling_hash(name: &DomainName) -> String {
    let digest = Sha256::digest(name.to_wire());
    base32::encode(Alphabet::Rfc4648Hex { padding: false }, &digest).to_ascii_lowercase()
}
