use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

const MAX_LABEL_LEN: usize = 63;
const MAX_WIRE_LEN: usize = 255;

/// Fully-qualified domain name in canonical presentation form: ASCII
/// letters lowercased, a trailing dot, and every octet outside the
/// printable range (plus `.` and `\\` inside a label) written as a
/// `\DDD` decimal escape. The root is `"."`.
///
/// The escape form is injective, so two names are equal exactly when their
/// wire forms are. `Ord` compares the decoded label octets and follows the
/// canonical DNS name order of RFC 4034 section 6.1, so a
/// `BTreeSet<DomainName>` iterates in the same order as an NSEC chain.
/// Uses `Arc<str>` so clones across pipeline stages are cheap.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(Arc<str>);

impl DomainName {
    pub fn root() -> Self {
        Self(Arc::from("."))
    }

    /// Parses a presentation-format name. `\X` and `\DDD` escapes are
    /// honoured. A missing trailing dot is accepted and the name is taken
    /// as absolute.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidDomainName("empty name".into()));
        }
        if trimmed == "." {
            return Ok(Self::root());
        }

        let invalid = |reason: &str| {
            DomainError::InvalidDomainName(format!("'{}' {}", trimmed, reason))
        };

        let mut labels: Vec<Vec<u8>> = Vec::new();
        let mut label = Vec::new();
        let mut bytes = trimmed.bytes();
        let mut terminated = false;
        while let Some(b) = bytes.next() {
            terminated = false;
            match b {
                b'.' => {
                    if label.is_empty() {
                        return Err(invalid("contains an empty label"));
                    }
                    labels.push(std::mem::take(&mut label));
                    terminated = true;
                }
                b'\\' => {
                    let octet = unescape(&mut bytes).ok_or_else(|| invalid("has a bad escape"))?;
                    label.push(octet);
                }
                b if b.is_ascii_whitespace() || b.is_ascii_control() => {
                    return Err(invalid("contains unsupported characters"))
                }
                b => label.push(b),
            }
        }
        if !terminated {
            labels.push(label);
        }

        Self::from_wire_labels(labels)
    }

    /// Builds a name from raw label octets ordered left to right.
    pub fn from_wire_labels<I, L>(labels: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut text = String::new();
        let mut wire_len = 1;
        for label in labels {
            let label = label.as_ref();
            if label.is_empty() {
                return Err(DomainError::InvalidDomainName("empty label".into()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "label of {} octets is longer than {}",
                    label.len(),
                    MAX_LABEL_LEN
                )));
            }
            wire_len += label.len() + 1;
            for &b in label {
                escape_into(&mut text, b.to_ascii_lowercase());
            }
            text.push('.');
        }
        if wire_len > MAX_WIRE_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "name exceeds {} octets",
                MAX_WIRE_LEN
            )));
        }
        if text.is_empty() {
            return Ok(Self::root());
        }
        Ok(Self(Arc::from(text)))
    }

    /// Builds a name from presentation-format labels ordered left to right.
    /// A label may carry escapes but no bare dot.
    pub fn from_labels<'a, I>(labels: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let decoded = labels
            .into_iter()
            .map(|label| {
                decode_label(label).ok_or_else(|| {
                    DomainError::InvalidDomainName(format!(
                        "label '{}' contains a dot or a bad escape",
                        label
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_wire_labels(decoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        &*self.0 == "."
    }

    /// Presentation-form labels from left to right; empty for the root.
    /// Canonical labels never contain a bare dot, so splitting is exact.
    pub fn labels(&self) -> Vec<&str> {
        if self.is_root() {
            return Vec::new();
        }
        self.0.trim_end_matches('.').split('.').collect()
    }

    /// Raw label octets from left to right.
    pub fn wire_labels(&self) -> Vec<Vec<u8>> {
        self.labels()
            .into_iter()
            .map(|label| decode_label(label).unwrap_or_default())
            .collect()
    }

    pub fn label_count(&self) -> usize {
        self.labels().len()
    }

    pub fn first_label(&self) -> Option<&str> {
        self.labels().into_iter().next()
    }

    pub fn parent(&self) -> Option<DomainName> {
        if self.is_root() {
            return None;
        }
        match self.0.split_once('.') {
            Some((_, rest)) if !rest.is_empty() => Some(Self(Arc::from(rest))),
            _ => Some(Self::root()),
        }
    }

    /// True when `self` equals `ancestor` or lies below it.
    pub fn is_subdomain_of(&self, ancestor: &DomainName) -> bool {
        if ancestor.is_root() || self == ancestor {
            return true;
        }
        self.0.ends_with(&*ancestor.0)
            && self.0.len() > ancestor.0.len()
            && self.0.as_bytes()[self.0.len() - ancestor.0.len() - 1] == b'.'
    }

    /// Labels of `self` that sit above `ancestor`, left to right. `None`
    /// when `self` is not below `ancestor`.
    pub fn relative_to(&self, ancestor: &DomainName) -> Option<Vec<&str>> {
        if !self.is_subdomain_of(ancestor) {
            return None;
        }
        let labels = self.labels();
        let keep = labels.len() - ancestor.label_count();
        Some(labels[..keep].to_vec())
    }

    pub fn prepend(&self, label: &str) -> Result<DomainName, DomainError> {
        self.prepend_all(&[label])
    }

    /// Prepends labels (left to right) in front of this name.
    pub fn prepend_all(&self, labels: &[&str]) -> Result<DomainName, DomainError> {
        let mut all: Vec<&str> = labels.to_vec();
        all.extend(self.labels());
        Self::from_labels(all)
    }

    /// Uncompressed wire form with lowercase labels, as used for digests and
    /// canonical RRset ordering.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.0.len() + 1);
        for label in self.wire_labels() {
            wire.push(label.len() as u8);
            wire.extend_from_slice(&label);
        }
        wire.push(0);
        wire
    }
}

/// Reads the rest of a `\X` or `\DDD` escape.
fn unescape(bytes: &mut impl Iterator<Item = u8>) -> Option<u8> {
    let first = bytes.next()?;
    if !first.is_ascii_digit() {
        return Some(first);
    }
    let mut value = u32::from(first - b'0');
    for _ in 0..2 {
        let digit = bytes.next().filter(u8::is_ascii_digit)?;
        value = value * 10 + u32::from(digit - b'0');
    }
    u8::try_from(value).ok()
}

/// Decodes one presentation label. `None` on a bare dot or a bad escape.
fn decode_label(label: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(label.len());
    let mut bytes = label.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'\\' => out.push(unescape(&mut bytes)?),
            b'.' => return None,
            b => out.push(b),
        }
    }
    Some(out)
}

fn escape_into(text: &mut String, b: u8) {
    match b {
        0x21..=0x7e if b != b'.' && b != b'\\' => text.push(char::from(b)),
        _ => {
            let _ = write!(text, "\\{:03}", b);
        }
    }
}

impl Ord for DomainName {
    fn cmp(&self, other: &Self) -> Ordering {
        let ours = self.wire_labels();
        let theirs = other.wire_labels();
        for (a, b) in ours.iter().rev().zip(theirs.iter().rev()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        ours.len().cmp(&theirs.len())
    }
}

impl PartialOrd for DomainName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for DomainName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0.to_string()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainName({})", self.0)
    }
}
