// SPDX-License-Identifier: MIT
//
// OrganizationRecord — the single source of truth for one onboarding run.
// Every identifier embedded in any generated or patched artifact is either a
// field of this record or a pure function of its fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// BPN prefix for legal entities. The numeric suffix is zero-padded to
/// [`BPN_DIGITS`] digits.
pub const BPN_PREFIX: &str = "BPNL";
/// Width of the numeric BPN suffix.
pub const BPN_DIGITS: usize = 12;

/// A Business Partner Number: `BPNL` + exactly 12 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bpn(String);

impl Bpn {
    /// Build a BPN from its numeric suffix, zero-padded to 12 digits.
    pub fn from_suffix(suffix: u64) -> Self {
        Bpn(format!("{BPN_PREFIX}{suffix:0width$}", width = BPN_DIGITS))
    }

    /// Parse an already-formatted BPN string. Returns `None` when the shape
    /// is wrong; format diagnostics belong to the validator, not here.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(BPN_PREFIX)?;
        if digits.len() == BPN_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Bpn(s.to_string()))
        } else {
            None
        }
    }

    /// Numeric suffix, used by the allocator for max+1 computation.
    pub fn suffix(&self) -> u64 {
        // Shape is enforced at construction; 12 digits always fit in u64.
        self.0[BPN_PREFIX.len()..].parse().unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bpn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One organization to be onboarded into the data space.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationRecord {
    /// Lowercase alphanumeric token, starts with a letter. Namespace and
    /// hostname component.
    pub name: String,
    /// Human-readable label; Title-cased `name` unless overridden.
    pub display_name: String,
    /// Unique business partner number.
    pub bpn: Bpn,
    /// Shared data-space domain (not unique per organization).
    pub domain: String,
}

impl OrganizationRecord {
    pub fn new(name: &str, display_name: Option<&str>, bpn: Bpn, domain: &str) -> Self {
        let display_name = display_name
            .map(str::to_string)
            .unwrap_or_else(|| title_case(name));
        OrganizationRecord {
            name: name.to_string(),
            display_name,
            bpn,
            domain: domain.to_string(),
        }
    }

    /// Decentralized identifier of the participant: `did:web:{name}.{domain}`.
    pub fn participant_did(&self) -> String {
        format!("did:web:{}.{}", self.name, self.domain)
    }

    /// Relative path of the membership verifiable-credential JWT produced by
    /// the credential-generation script.
    pub fn membership_jwt(&self) -> String {
        format!("{}.membership.jwt", self.name)
    }

    /// Public connector endpoint for API collections.
    pub fn connector_url(&self) -> String {
        format!("https://{}.{}", self.name, self.domain)
    }

    /// Upper-cased name, used as the prefix of collection variable keys
    /// (`COMPANYZ_BPN`, `COMPANYZ_CONNECTOR_URL`).
    pub fn env_prefix(&self) -> String {
        self.name.to_uppercase()
    }
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
