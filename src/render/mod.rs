// SPDX-License-Identifier: MIT
//! Template Renderer — one [`GeneratedFragment`] per target artifact, all
//! rendered from the same [`OrganizationRecord`] so no artifact can carry an
//! identifier the others disagree with.

mod templates;

pub use templates::expand;

use crate::error::{OnboardError, Result};
use crate::layout::DeploymentLayout;
use crate::org::OrganizationRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Dedicated anchor line the credential-generation script must carry inside
/// its companies list. Chosen over pattern-matching the list itself: a
/// near-miss match inside arbitrary Python would silently corrupt the script.
pub const JWT_GEN_MARKER: &str = "# orgadd:companies";

/// How a fragment lands in its target artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Write a new file; the target must not exist yet.
    CreateFile,
    /// Append at end of file, separated by a blank line.
    AppendEof,
    /// Insert a pretty-printed JSON object at the end of the named
    /// top-level array, preserving the file's own indentation.
    JsonArrayInsert { key: &'static str },
    /// Insert the fragment immediately above the marker line.
    InsertAboveMarker { marker: &'static str },
}

/// One organization's contribution to one artifact. Stateless; consumed
/// exactly once by the patcher.
#[derive(Debug, Clone)]
pub struct GeneratedFragment {
    pub path: PathBuf,
    pub op: PatchOp,
    pub text: String,
    /// Name-keyed substring whose presence in the target means the artifact
    /// was already patched for this organization.
    pub probe: String,
    /// Path relative to the corpus root, for reports.
    pub label: String,
}

/// Participant entry appended to the bootstrap seed.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedParticipant {
    pub name: String,
    pub bpn: String,
    pub did: String,
    pub membership_credential: String,
}

impl SeedParticipant {
    pub fn from_record(record: &OrganizationRecord) -> Self {
        SeedParticipant {
            name: record.name.clone(),
            bpn: record.bpn.to_string(),
            did: record.participant_did(),
            membership_credential: format!("assets/did/{}", record.membership_jwt()),
        }
    }
}

/// Render all five fragments for one organization, in apply order:
/// resource file, variables append, seed entry, credential entry, collection.
pub fn render_all(
    record: &OrganizationRecord,
    layout: &DeploymentLayout,
    file_number: u32,
) -> Result<Vec<GeneratedFragment>> {
    let fragments = vec![
        GeneratedFragment {
            path: layout.org_tf(file_number, &record.name),
            op: PatchOp::CreateFile,
            text: expand(templates::ORGANIZATION_TF, record),
            probe: String::new(),
            label: format!("deployment/{file_number}-{}.tf", record.name),
        },
        GeneratedFragment {
            path: layout.variables_tf(),
            op: PatchOp::AppendEof,
            text: expand(templates::VARIABLES_TF_APPEND, record),
            probe: format!("variable \"{}_bpn\"", record.name),
            label: "deployment/variables.tf".to_string(),
        },
        GeneratedFragment {
            path: layout.seed_json(),
            op: PatchOp::JsonArrayInsert {
                key: "participants",
            },
            text: seed_entry_json(record)?,
            probe: format!("\"name\": \"{}\"", record.name),
            label: "deployment/assets/seed/mvds-seed.json".to_string(),
        },
        GeneratedFragment {
            path: layout.jwt_gen(),
            op: PatchOp::InsertAboveMarker {
                marker: JWT_GEN_MARKER,
            },
            text: expand(templates::JWT_GEN_ENTRY, record),
            probe: format!("\"filename\": \"{}\"", record.membership_jwt()),
            label: "deployment/assets/did/jwt-gen.py".to_string(),
        },
        GeneratedFragment {
            path: layout.collection_for(&record.name),
            op: PatchOp::CreateFile,
            text: render_collection(record, layout)?,
            probe: String::new(),
            label: format!(
                "data-sharing/api-collections/{}.postman_collection.json",
                record.name
            ),
        },
    ];
    debug!(count = fragments.len(), org = %record.name, "fragments rendered");
    Ok(fragments)
}

fn seed_entry_json(record: &OrganizationRecord) -> Result<String> {
    let entry = SeedParticipant::from_record(record);
    // Owned record type; pretty output is re-indented by the patcher.
    serde_json::to_string_pretty(&entry)
        .map_err(|e| OnboardError::io(PathBuf::from("mvds-seed.json"), e.into()))
}

/// Structural duplicate of the template organization's collection with
/// name, BPN and connector URL substituted. Keys of the template org
/// (`COMPANY_X_*`) are rewritten to the new organization's prefix; every
/// other part of the collection is carried over untouched.
fn render_collection(record: &OrganizationRecord, layout: &DeploymentLayout) -> Result<String> {
    let template_path = layout.collection_template();
    let raw =
        fs::read_to_string(&template_path).map_err(|e| OnboardError::io(&template_path, e))?;
    let mut collection: Value =
        serde_json::from_str(&raw).map_err(|e| OnboardError::RegistryCorrupt {
            path: template_path.clone(),
            reason: format!("collection template is not valid JSON: {e}"),
        })?;

    if let Some(info) = collection.get_mut("info").and_then(Value::as_object_mut) {
        info.insert(
            "name".to_string(),
            Value::String(format!("{} Connector Management API", record.display_name)),
        );
        info.insert(
            "description".to_string(),
            Value::String(format!(
                "API collection for {} connector operations",
                record.name
            )),
        );
    }

    let prefix = record.env_prefix();
    if let Some(variables) = collection.get_mut("variable").and_then(Value::as_array_mut) {
        for variable in variables {
            match variable.get("key").and_then(Value::as_str) {
                Some("COMPANY_X_CONNECTOR_URL") => {
                    variable["key"] = Value::String(format!("{prefix}_CONNECTOR_URL"));
                    variable["value"] = Value::String(record.connector_url());
                }
                Some("COMPANY_X_BPN") => {
                    variable["key"] = Value::String(format!("{prefix}_BPN"));
                    variable["value"] = Value::String(record.bpn.to_string());
                }
                _ => {}
            }
        }
    }

    let mut out = serde_json::to_string_pretty(&collection)
        .map_err(|e| OnboardError::io(template_path, e.into()))?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::{Bpn, OrganizationRecord};
    use std::fs;

    fn record() -> OrganizationRecord {
        OrganizationRecord::new("companyz", None, Bpn::from_suffix(3), "example.com")
    }

    fn fixture_layout() -> (tempfile::TempDir, DeploymentLayout) {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = DeploymentLayout::new(dir.path());
        fs::create_dir_all(layout.collections_dir()).unwrap();
        fs::write(
            layout.collection_template(),
            serde_json::json!({
                "info": {
                    "name": "Companyx Connector Management API",
                    "description": "API collection for companyx connector operations"
                },
                "variable": [
                    { "key": "COMPANY_X_CONNECTOR_URL", "value": "https://companyx.example.com" },
                    { "key": "COMPANY_X_BPN", "value": "BPNL000000000001" }
                ],
                "item": [ { "name": "negotiate contract" } ]
            })
            .to_string(),
        )
        .unwrap();
        (dir, layout)
    }

    #[test]
    fn renders_five_fragments_in_apply_order() {
        let (_dir, layout) = fixture_layout();
        let fragments = render_all(&record(), &layout, 5).unwrap();
        assert_eq!(fragments.len(), 5);
        assert_eq!(fragments[0].op, PatchOp::CreateFile);
        assert!(fragments[0].label.ends_with("5-companyz.tf"));
        assert_eq!(fragments[4].op, PatchOp::CreateFile);
    }

    #[test]
    fn every_fragment_identifier_is_traceable_to_the_record() {
        let (_dir, layout) = fixture_layout();
        let rec = record();
        for fragment in render_all(&rec, &layout, 5).unwrap() {
            // Any BPN-shaped string in a fragment must be the record's own.
            for m in regex::Regex::new(r"BPNL\d{12}")
                .unwrap()
                .find_iter(&fragment.text)
            {
                assert_eq!(m.as_str(), rec.bpn.as_str(), "in {}", fragment.label);
            }
        }
    }

    #[test]
    fn collection_variables_are_rekeyed() {
        let (_dir, layout) = fixture_layout();
        let rendered = render_collection(&record(), &layout).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        let vars = value["variable"].as_array().unwrap();
        assert_eq!(vars[0]["key"], "COMPANYZ_CONNECTOR_URL");
        assert_eq!(vars[0]["value"], "https://companyz.example.com");
        assert_eq!(vars[1]["key"], "COMPANYZ_BPN");
        assert_eq!(vars[1]["value"], "BPNL000000000003");
        assert_eq!(value["info"]["name"], "Companyz Connector Management API");
        // Untouched structure is carried over.
        assert_eq!(value["item"][0]["name"], "negotiate contract");
    }

    #[test]
    fn missing_collection_template_is_an_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = DeploymentLayout::new(dir.path());
        let err = render_collection(&record(), &layout).unwrap_err();
        assert!(matches!(err, crate::error::OnboardError::Io { .. }));
    }

    #[test]
    fn seed_entry_fields_match_the_record() {
        let entry = SeedParticipant::from_record(&record());
        assert_eq!(entry.bpn, "BPNL000000000003");
        assert_eq!(entry.did, "did:web:companyz.example.com");
        assert_eq!(entry.membership_credential, "assets/did/companyz.membership.jwt");
    }
}
