// SPDX-License-Identifier: MIT
//! Embedded artifact templates.
//!
//! Each template is a `{{placeholder}}`-parameterized text block; `expand`
//! substitutes every placeholder from a single [`OrganizationRecord`] so all
//! fragments of one run agree on every identifier.

use crate::org::OrganizationRecord;

/// Substitute all `{{placeholder}}` occurrences from the record.
pub fn expand(template: &str, record: &OrganizationRecord) -> String {
    template
        .replace("{{org_name}}", &record.name)
        .replace("{{display_name}}", &record.display_name)
        .replace("{{bpn}}", record.bpn.as_str())
        .replace("{{domain}}", &record.domain)
        .replace("{{participant_did}}", &record.participant_did())
        .replace("{{membership_jwt}}", &record.membership_jwt())
        .replace("{{connector_url}}", &record.connector_url())
}

// ─── Per-organization resource file ─────────────────────────────────────────

/// Standalone resource file `deployment/{N}-{org}.tf`: namespace, identity
/// hub, connector, ingress. Mirrors the blocks the seed-data file wires
/// together for the existing organizations.
pub const ORGANIZATION_TF: &str = r#"# {{display_name}} — MVDS participant resources

resource "kubernetes_namespace" "{{org_name}}_namespace" {
  metadata {
    name = var.{{org_name}}_namespace
  }
}

module "{{org_name}}_tx-identity-hub" {
  source = "./modules/tx-identity-hub"

  humanReadableName = var.{{org_name}}_humanReadableName
  namespace         = kubernetes_namespace.{{org_name}}_namespace.metadata[0].name
  participant-did   = "{{participant_did}}"
  credentials-dir   = "assets/did"
  vc-membership     = "{{membership_jwt}}"
  superuser-apikey  = var.{{org_name}}_ih_superuser_apikey
}

module "{{org_name}}_connector" {
  source = "./modules/connector"

  humanReadableName = var.{{org_name}}_humanReadableName
  namespace         = kubernetes_namespace.{{org_name}}_namespace.metadata[0].name
  participant-did   = "{{participant_did}}"
  bpn               = var.{{org_name}}_bpn
  identityhub-url   = module.{{org_name}}_tx-identity-hub.internal-url

  depends_on = [module.{{org_name}}_tx-identity-hub]
}

module "{{org_name}}_connector_ingress" {
  source = "./modules/ingress"

  namespace = kubernetes_namespace.{{org_name}}_namespace.metadata[0].name
  host      = "{{org_name}}.{{domain}}"
  service   = module.{{org_name}}_connector.service-name

  depends_on = [module.{{org_name}}_connector]
}
"#;

// ─── Shared variable file append ────────────────────────────────────────────

/// Default-value entries appended to `variables.tf`. The `{{org_name}}_bpn`
/// block is the record the registry scan keys on; its shape must stay in
/// sync with the scan regex in `registry.rs`.
pub const VARIABLES_TF_APPEND: &str = r#"variable "{{org_name}}_humanReadableName" {
  description = "Human readable name for {{org_name}}"
  type        = string
  default     = "{{display_name}}"
}

variable "{{org_name}}_bpn" {
  description = "Business Partner Number for {{org_name}}"
  type        = string
  default     = "{{bpn}}"
}

variable "{{org_name}}_namespace" {
  description = "Kubernetes namespace for {{org_name}}"
  type        = string
  default     = "{{org_name}}"
}

variable "{{org_name}}_ih_superuser_apikey" {
  description = "IdentityHub super-user API key for {{org_name}}"
  type        = string
  default     = "c3VwZXItdXNlcg==.{{org_name}}"
}
"#;

// ─── Credential-generation script entry ─────────────────────────────────────

/// One companies-list element for `jwt-gen.py`, inserted above the
/// dedicated marker line.
pub const JWT_GEN_ENTRY: &str = r#"    {
        "filename": "{{membership_jwt}}",
        "holder_id": f"did:web:{{org_name}}.{domain}",
        "holder_identifier": "{{bpn}}",
    },
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::{Bpn, OrganizationRecord};

    fn record() -> OrganizationRecord {
        OrganizationRecord::new("companyz", None, Bpn::from_suffix(3), "example.com")
    }

    #[test]
    fn expand_leaves_no_placeholders() {
        for template in [ORGANIZATION_TF, VARIABLES_TF_APPEND, JWT_GEN_ENTRY] {
            let out = expand(template, &record());
            assert!(!out.contains("{{"), "unexpanded placeholder in: {out}");
        }
    }

    #[test]
    fn jwt_entry_keeps_the_runtime_domain_fstring() {
        // {domain} (single braces) is a Python f-string placeholder resolved
        // by the script at credential-generation time, not by this tool.
        let out = expand(JWT_GEN_ENTRY, &record());
        assert!(out.contains("f\"did:web:companyz.{domain}\""));
        assert!(out.contains("\"holder_identifier\": \"BPNL000000000003\""));
    }

    #[test]
    fn variables_append_matches_registry_scan_shape() {
        let out = expand(VARIABLES_TF_APPEND, &record());
        assert!(out.contains("variable \"companyz_bpn\""));
        assert!(out.contains("default     = \"BPNL000000000003\""));
    }
}
