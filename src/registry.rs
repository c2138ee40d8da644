// SPDX-License-Identifier: MIT
//
// Identifier Registry — reconstructs the set of already-onboarded
// organizations by scanning the shared variable file.
//
// The artifacts themselves are the source of truth: there is no database.
// The scan is recomputed once per invocation and never mutated, so every
// duplicate/allocation decision in a run is made against the same snapshot.

use crate::error::{OnboardError, Result};
use crate::org::Bpn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Matches the header + body of a generated `{name}_bpn` variable block.
/// Bodies of generated blocks are flat string variables, so a `[^}]*` body
/// is unambiguous. Unrelated variables (no `_bpn` suffix) never match.
static BPN_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"variable\s+"([a-z][a-z0-9]*)_bpn"\s*\{([^}]*)\}"#).expect("static regex")
});

/// Mandatory `default = "BPNL…"` line inside a bpn block.
static BPN_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"default\s*=\s*"(BPNL\d{12})""#).expect("static regex"));

/// In-memory view of every organization already present in the corpus.
///
/// Invariant: no two entries share a name or a BPN (enforced at scan time —
/// a violation means the corpus was edited by hand and is corrupt).
#[derive(Debug, Default)]
pub struct Registry {
    orgs: BTreeMap<String, Bpn>,
}

impl Registry {
    /// Scan the variable-declaration artifact for onboarded organizations.
    ///
    /// Tolerates arbitrary unrelated content; extracts only blocks matching
    /// the generated shape. A matching block with a missing or malformed
    /// mandatory `default` is a hard `RegistryCorrupt` failure — silently
    /// skipping it could hand out a BPN that is already live.
    pub fn scan(variables_tf: &Path) -> Result<Registry> {
        let content =
            fs::read_to_string(variables_tf).map_err(|e| OnboardError::io(variables_tf, e))?;
        Self::scan_str(&content, variables_tf)
    }

    fn scan_str(content: &str, path: &Path) -> Result<Registry> {
        let mut orgs = BTreeMap::new();
        for caps in BPN_BLOCK.captures_iter(content) {
            let name = caps[1].to_string();
            let body = &caps[2];
            let bpn = BPN_DEFAULT
                .captures(body)
                .and_then(|c| Bpn::parse(&c[1]))
                .ok_or_else(|| OnboardError::RegistryCorrupt {
                    path: path.to_path_buf(),
                    reason: format!(
                        "variable \"{name}_bpn\" has no well-formed default BPN"
                    ),
                })?;
            if orgs.values().any(|existing| *existing == bpn) {
                return Err(OnboardError::RegistryCorrupt {
                    path: path.to_path_buf(),
                    reason: format!("BPN {bpn} is declared for more than one organization"),
                });
            }
            if orgs.insert(name.clone(), bpn).is_some() {
                return Err(OnboardError::RegistryCorrupt {
                    path: path.to_path_buf(),
                    reason: format!("organization '{name}' is declared more than once"),
                });
            }
        }
        debug!(count = orgs.len(), "registry scanned");
        Ok(Registry { orgs })
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.orgs.contains_key(name)
    }

    pub fn contains_bpn(&self, bpn: &Bpn) -> bool {
        self.orgs.values().any(|b| b == bpn)
    }

    /// Numeric suffixes of every allocated BPN, for max+1 allocation.
    pub fn bpn_suffixes(&self) -> impl Iterator<Item = u64> + '_ {
        self.orgs.values().map(Bpn::suffix)
    }

    pub fn len(&self) -> usize {
        self.orgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VARIABLES_TF: &str = r#"
variable "domain_name" {
  type    = string
  default = "example.com"
}

variable "companyx_bpn" {
  description = "Business Partner Number for companyx"
  type        = string
  default     = "BPNL000000000001"
}

variable "companyx_namespace" {
  type    = string
  default = "companyx"
}

variable "companyy_bpn" {
  description = "Business Partner Number for companyy"
  type        = string
  default     = "BPNL000000000002"
}
"#;

    fn scan(content: &str) -> Result<Registry> {
        Registry::scan_str(content, &PathBuf::from("variables.tf"))
    }

    #[test]
    fn extracts_generated_blocks_and_ignores_unrelated_content() {
        let reg = scan(VARIABLES_TF).unwrap();
        assert_eq!(reg.len(), 2);
        assert!(reg.contains_name("companyx"));
        assert!(reg.contains_name("companyy"));
        assert!(!reg.contains_name("domain"));
        assert!(reg.contains_bpn(&Bpn::parse("BPNL000000000002").unwrap()));
    }

    #[test]
    fn missing_default_is_corrupt_not_skipped() {
        let broken = r#"
variable "companyx_bpn" {
  description = "no default here"
  type        = string
}
"#;
        let err = scan(broken).unwrap_err();
        assert!(
            matches!(err, OnboardError::RegistryCorrupt { .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn malformed_default_is_corrupt() {
        let broken = r#"
variable "companyx_bpn" {
  default = "BPNL00000000000X"
}
"#;
        assert!(matches!(
            scan(broken).unwrap_err(),
            OnboardError::RegistryCorrupt { .. }
        ));
    }

    #[test]
    fn duplicate_bpn_is_corrupt() {
        let broken = r#"
variable "companyx_bpn" {
  default = "BPNL000000000001"
}
variable "companyy_bpn" {
  default = "BPNL000000000001"
}
"#;
        assert!(matches!(
            scan(broken).unwrap_err(),
            OnboardError::RegistryCorrupt { .. }
        ));
    }

    #[test]
    fn empty_corpus_scans_clean() {
        let reg = scan("# nothing onboarded yet\n").unwrap();
        assert!(reg.is_empty());
    }
}
