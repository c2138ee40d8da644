//! Input validation — pure checks against syntax rules and the registry
//! snapshot taken at the start of the run. No side effects.

use crate::error::{OnboardError, Result};
use crate::layout::DeploymentLayout;
use crate::org::{Bpn, BPN_DIGITS, BPN_PREFIX};
use crate::registry::Registry;
use once_cell::sync::Lazy;
use regex::Regex;

/// Organization names become namespaces and hostname components, so DNS
/// label limits apply.
const NAME_MIN: usize = 3;
const NAME_MAX: usize = 63;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*$").expect("static regex"));

/// One dot minimum, DNS label characters, no leading/trailing hyphen per label.
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$")
        .expect("static regex")
});

pub fn validate_name(name: &str) -> Result<()> {
    if !NAME_RE.is_match(name) {
        return Err(OnboardError::Validation {
            field: "org-name",
            reason: format!("'{name}' must be lowercase alphanumeric and start with a letter"),
        });
    }
    if name.len() < NAME_MIN || name.len() > NAME_MAX {
        return Err(OnboardError::Validation {
            field: "org-name",
            reason: format!(
                "'{name}' must be {NAME_MIN}-{NAME_MAX} characters (DNS label limits)"
            ),
        });
    }
    Ok(())
}

pub fn validate_bpn(bpn: &str) -> Result<Bpn> {
    Bpn::parse(bpn).ok_or_else(|| OnboardError::Validation {
        field: "bpn",
        reason: format!("'{bpn}' must be {BPN_PREFIX} followed by exactly {BPN_DIGITS} digits"),
    })
}

pub fn validate_domain(domain: &str) -> Result<()> {
    // DOMAIN_RE requires at least one dot via the repeated label group.
    if domain.len() > 253 || !DOMAIN_RE.is_match(domain) {
        return Err(OnboardError::Validation {
            field: "domain",
            reason: format!("'{domain}' is not a fully-qualified domain name"),
        });
    }
    Ok(())
}

/// Validate the full request against syntax rules and the registry.
///
/// Returns the explicit BPN, parsed, when one was supplied; `None` leaves
/// allocation to the allocator.
pub fn validate_request(
    registry: &Registry,
    name: &str,
    bpn: Option<&str>,
    domain: &str,
) -> Result<Option<Bpn>> {
    validate_name(name)?;
    validate_domain(domain)?;
    let bpn = bpn.map(validate_bpn).transpose()?;

    if registry.contains_name(name) {
        return Err(OnboardError::DuplicateOrganization(name.to_string()));
    }
    if let Some(ref bpn) = bpn {
        if registry.contains_bpn(bpn) {
            return Err(OnboardError::DuplicateOrganization(format!(
                "{name} (BPN {bpn} already allocated)"
            )));
        }
    }
    Ok(bpn)
}

/// Pre-flight: every artifact the run patches or templates from must already
/// exist. Reported as a validation failure — nothing has been touched.
pub fn check_layout(layout: &DeploymentLayout) -> Result<()> {
    let missing = layout.missing_required();
    if !missing.is_empty() {
        return Err(OnboardError::Validation {
            field: "root",
            reason: format!(
                "{} is missing required artifacts: {}",
                layout.root().display(),
                missing.join(", ")
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn name_boundaries() {
        assert!(validate_name("abc123").is_ok());
        assert!(validate_name("1abc").is_err(), "must start with a letter");
        assert!(validate_name("ab").is_err(), "too short");
        assert!(validate_name("companyZ").is_err(), "uppercase rejected");
        assert!(validate_name("company-z").is_err(), "hyphen rejected");
        assert!(validate_name(&"a".repeat(64)).is_err(), "over DNS limit");
        assert!(validate_name(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn bpn_boundaries() {
        assert!(validate_bpn("BPNL000000000005").is_ok());
        assert!(validate_bpn("BPNL00000000000X").is_err(), "non-digit");
        assert!(validate_bpn("BPNL01").is_err(), "wrong width");
        assert!(validate_bpn("bpnl000000000005").is_err(), "lowercase prefix");
    }

    #[test]
    fn domain_boundaries() {
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("sub.example.co.uk").is_ok());
        assert!(validate_domain("nodothere").is_err(), "needs a dot");
        assert!(validate_domain("bad domain.com").is_err(), "whitespace");
        assert!(validate_domain("-bad.com").is_err(), "leading hyphen");
    }

    #[test]
    fn duplicate_name_rejected_against_registry() {
        let reg = registry_with_companyx();
        let err = validate_request(&reg, "companyx", None, "example.com").unwrap_err();
        assert!(matches!(err, OnboardError::DuplicateOrganization(_)));
    }

    #[test]
    fn duplicate_bpn_rejected_against_registry() {
        let reg = registry_with_companyx();
        let err =
            validate_request(&reg, "companyz", Some("BPNL000000000001"), "example.com")
                .unwrap_err();
        assert!(matches!(err, OnboardError::DuplicateOrganization(_)));
    }

    #[test]
    fn fresh_request_passes_and_parses_bpn() {
        let reg = registry_with_companyx();
        let bpn = validate_request(&reg, "companyz", Some("BPNL000000000009"), "example.com")
            .unwrap()
            .unwrap();
        assert_eq!(bpn.as_str(), "BPNL000000000009");
    }

    fn registry_with_companyx() -> Registry {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("variables.tf");
        std::fs::write(
            &path,
            "variable \"companyx_bpn\" {\n  default = \"BPNL000000000001\"\n}\n",
        )
        .unwrap();
        Registry::scan(&path).unwrap()
    }
}
