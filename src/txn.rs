// SPDX-License-Identifier: MIT
//
// Transaction Manager — snapshot all, then mutate all.
//
// True multi-file atomicity does not exist on a plain filesystem. The
// residual guarantees here are: (a) any in-process failure after mutation
// begins restores every snapshot before the error propagates, so a
// subsequent invocation never observes a half-onboarded organization, and
// (b) `.backup` siblings written before the first mutation survive a
// process kill as the manual recovery path.

use crate::error::{OnboardError, Result};
use crate::org::OrganizationRecord;
use crate::patch;
use crate::render::{GeneratedFragment, PatchOp};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened (or would happen) to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Created,
    Patched,
}

/// Per-artifact outcome, with content for diff previews.
#[derive(Debug)]
pub struct ArtifactChange {
    pub label: String,
    pub path: PathBuf,
    pub action: ChangeAction,
    /// Pre-run content; empty for created files.
    pub before: String,
    pub after: String,
}

/// Result of one transaction.
#[derive(Debug)]
pub enum RunOutcome {
    /// Dry run: computed changes, nothing written.
    Preview(Vec<ArtifactChange>),
    /// Real run: applied changes plus the backup files left as recovery aid.
    Applied {
        changes: Vec<ArtifactChange>,
        backups: Vec<PathBuf>,
    },
}

/// Apply all fragments transactionally, or preview them.
pub fn apply(
    record: &OrganizationRecord,
    fragments: &[GeneratedFragment],
    dry_run: bool,
) -> Result<RunOutcome> {
    // Phase 1 — snapshot every artifact that will be touched, before any
    // write. Reads-for-validation are never interleaved with writes.
    let mut snapshots: Vec<(PathBuf, String)> = Vec::new();
    for fragment in fragments {
        match fragment.op {
            PatchOp::CreateFile => {
                if fragment.path.exists() {
                    return Err(OnboardError::AlreadyPatched {
                        path: fragment.path.clone(),
                        org: record.name.clone(),
                    });
                }
            }
            _ => {
                let content = fs::read_to_string(&fragment.path)
                    .map_err(|e| OnboardError::io(&fragment.path, e))?;
                snapshots.push((fragment.path.clone(), content));
            }
        }
    }
    debug!(snapshots = snapshots.len(), "artifact set snapshotted");

    if dry_run {
        // Compute every patch in memory; no mutation-phase errors possible
        // because nothing mutates.
        let mut changes = Vec::new();
        for fragment in fragments {
            changes.push(compute_change(record, fragment, &snapshots)?);
        }
        return Ok(RunOutcome::Preview(changes));
    }

    // Phase 2 — backups, before the first mutation.
    let mut backups = Vec::new();
    for (path, content) in &snapshots {
        let backup = backup_path(path);
        if let Err(e) = fs::write(&backup, content) {
            return Err(OnboardError::io(&backup, e));
        }
        backups.push(backup);
    }

    // Phase 3 — apply artifact-by-artifact; any failure rolls everything back.
    let mut changes: Vec<ArtifactChange> = Vec::new();
    let mut created: Vec<PathBuf> = Vec::new();
    for fragment in fragments {
        let change = match compute_change(record, fragment, &snapshots) {
            Ok(c) => c,
            Err(e) => {
                rollback(&snapshots, &created, &backups);
                return Err(e);
            }
        };
        if let Err(e) = fs::write(&change.path, &change.after) {
            rollback(&snapshots, &created, &backups);
            return Err(OnboardError::io(&change.path, e));
        }
        if change.action == ChangeAction::Created {
            created.push(change.path.clone());
        }
        info!(artifact = %change.label, action = ?change.action, "artifact written");
        changes.push(change);
    }

    Ok(RunOutcome::Applied { changes, backups })
}

/// Compute the post-patch content of one artifact without writing.
fn compute_change(
    record: &OrganizationRecord,
    fragment: &GeneratedFragment,
    snapshots: &[(PathBuf, String)],
) -> Result<ArtifactChange> {
    if fragment.op == PatchOp::CreateFile {
        return Ok(ArtifactChange {
            label: fragment.label.clone(),
            path: fragment.path.clone(),
            action: ChangeAction::Created,
            before: String::new(),
            after: fragment.text.clone(),
        });
    }
    let before = snapshots
        .iter()
        .find(|(p, _)| p == &fragment.path)
        .map(|(_, c)| c.as_str())
        .unwrap_or_default();
    patch::check_not_patched(before, fragment, &record.name)?;
    let after = patch::apply(before, fragment)?;
    Ok(ArtifactChange {
        label: fragment.label.clone(),
        path: fragment.path.clone(),
        action: ChangeAction::Patched,
        before: before.to_string(),
        after,
    })
}

/// Restore every snapshot, remove files created this run, and drop the
/// backups written this run (their content was just restored).
fn rollback(snapshots: &[(PathBuf, String)], created: &[PathBuf], backups: &[PathBuf]) {
    warn!("patch failed — rolling back all artifacts");
    let mut restore_failed = false;
    for (path, content) in snapshots {
        if let Err(e) = fs::write(path, content) {
            // Nothing left to do in-process; the .backup sibling still holds
            // the original for manual recovery.
            warn!(path = %path.display(), error = %e, "rollback write failed");
            restore_failed = true;
        }
    }
    for path in created {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "rollback remove failed");
        }
    }
    if !restore_failed {
        // All originals are back in place; the backups written this run
        // would only shadow them.
        for path in backups {
            let _ = fs::remove_file(path);
        }
    }
}

/// Backup sibling: `variables.tf` → `variables.tf.backup`.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".backup");
    path.with_file_name(name)
}
