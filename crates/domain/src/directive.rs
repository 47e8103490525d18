use crate::{DomainError, DomainName};
use std::collections::BTreeSet;

/// One parsed input line.
///
/// `zone ns1 ns2 ...` names a delegation explicitly; `.ancestor ns1 ns2 ...`
/// asks for every delegation signalled below `ancestor` to be discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Explicit {
        zone: DomainName,
        nameservers: BTreeSet<DomainName>,
    },
    AncestorScan(AncestorScanRequest),
}

/// Ancestor zone plus the nameserver set used both as walk targets and as
/// the trust anchor for every discovered child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorScanRequest {
    pub ancestor: DomainName,
    pub nameservers: BTreeSet<DomainName>,
}

impl Directive {
    /// Parses one input line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Directive>, DomainError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let invalid = |reason: String| DomainError::InvalidDirective {
            line: line_number,
            reason,
        };

        let mut tokens = trimmed.split_whitespace();
        let head = tokens
            .next()
            .ok_or_else(|| invalid("missing zone name".into()))?;

        let nameservers = tokens
            .map(DomainName::parse)
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| invalid(e.to_string()))?;
        if nameservers.is_empty() {
            return Err(invalid(format!("no nameservers given for '{}'", head)));
        }

        if let Some(ancestor) = head.strip_prefix('.') {
            if ancestor.is_empty() || ancestor.starts_with('.') {
                return Err(invalid(format!("'{}' is not a valid ancestor", head)));
            }
            let ancestor = DomainName::parse(ancestor).map_err(|e| invalid(e.to_string()))?;
            return Ok(Some(Directive::AncestorScan(AncestorScanRequest {
                ancestor,
                nameservers,
            })));
        }

        let zone = DomainName::parse(head).map_err(|e| invalid(e.to_string()))?;
        if zone.is_root() {
            return Err(invalid("the root cannot be bootstrapped".into()));
        }
        Ok(Some(Directive::Explicit { zone, nameservers }))
    }
}
