//! Report/Diff Emitter — dry-run previews and applied-run summaries.
//!
//! The preview is a unified-diff-style rendering. Every change this tool
//! makes is a pure insertion (or a whole-file creation), so the diff is
//! computed from the common prefix/suffix of the before/after line sets —
//! no general-purpose diff machinery needed.

use crate::org::OrganizationRecord;
use crate::txn::{ArtifactChange, ChangeAction};
use std::fmt::Write as _;
use std::path::PathBuf;

const CONTEXT: usize = 3;

/// Render the dry-run preview: one diff block per artifact.
pub fn render_preview(record: &OrganizationRecord, changes: &[ArtifactChange]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Dry run for '{}' (BPN {}) — no files modified.\n",
        record.name, record.bpn
    );
    for change in changes {
        out.push_str(&unified_diff(&change.label, &change.before, &change.after));
        out.push('\n');
    }
    out.push_str(&identity_block(record));
    out
}

/// Render the applied-run summary: per-artifact action, resolved
/// identifiers, backups, operator follow-up.
pub fn render_summary(
    record: &OrganizationRecord,
    changes: &[ArtifactChange],
    backups: &[PathBuf],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Organization '{}' onboarded.\n", record.name);
    for change in changes {
        let verb = match change.action {
            ChangeAction::Created => "created",
            ChangeAction::Patched => "patched",
        };
        let _ = writeln!(out, "  {verb:<8} {}", change.label);
    }
    out.push('\n');
    out.push_str(&identity_block(record));
    if !backups.is_empty() {
        out.push_str("\nBackups (pre-run content, for manual recovery):\n");
        for backup in backups {
            let _ = writeln!(out, "  {}", backup.display());
        }
    }
    out.push_str(&next_steps(record));
    out
}

fn identity_block(record: &OrganizationRecord) -> String {
    format!(
        "Resolved identifiers:\n  BPN:             {}\n  participant DID: {}\n  connector URL:   {}\n",
        record.bpn,
        record.participant_did(),
        record.connector_url(),
    )
}

fn next_steps(record: &OrganizationRecord) -> String {
    format!(
        "\nNext steps:\n  \
         1. Regenerate DID credentials:\n       \
            cd deployment/assets/did && python3 jwt-gen.py --regenerate-keys --sign-jwts --domain {domain} --assets-dir .\n  \
         2. Apply the deployment:\n       \
            cd deployment && terraform plan && terraform apply\n  \
         3. Verify:\n       \
            kubectl get pods -n {name}\n       \
            nslookup {name}.{domain}\n  \
         4. Import data-sharing/api-collections/{name}.postman_collection.json\n",
        name = record.name,
        domain = record.domain,
    )
}

/// Unified diff of a single contiguous insertion (or a file creation).
pub fn unified_diff(label: &str, before: &str, after: &str) -> String {
    let old: Vec<&str> = before.lines().collect();
    let new: Vec<&str> = after.lines().collect();

    if before.is_empty() {
        let mut out = format!("--- /dev/null\n+++ b/{label}\n@@ -0,0 +1,{} @@\n", new.len());
        for line in &new {
            let _ = writeln!(out, "+{line}");
        }
        return out;
    }

    // Common prefix/suffix; the middle of `new` is the insertion.
    let mut prefix = 0;
    while prefix < old.len() && prefix < new.len() && old[prefix] == new[prefix] {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < old.len() - prefix
        && suffix < new.len() - prefix
        && old[old.len() - 1 - suffix] == new[new.len() - 1 - suffix]
    {
        suffix += 1;
    }

    if prefix == old.len() && prefix == new.len() {
        return format!("--- a/{label}\n+++ b/{label}\n(no changes)\n");
    }

    let ctx_start = prefix.saturating_sub(CONTEXT);
    let old_end = old.len() - suffix;
    let new_end = new.len() - suffix;
    let ctx_end = (old_end + CONTEXT).min(old.len());

    let old_count = (prefix - ctx_start) + (old_end - prefix) + (ctx_end - old_end);
    let new_count = (prefix - ctx_start) + (new_end - prefix) + (ctx_end - old_end);

    let mut out = format!(
        "--- a/{label}\n+++ b/{label}\n@@ -{},{} +{},{} @@\n",
        ctx_start + 1,
        old_count,
        ctx_start + 1,
        new_count
    );
    for line in &old[ctx_start..prefix] {
        let _ = writeln!(out, " {line}");
    }
    for line in &old[prefix..old_end] {
        let _ = writeln!(out, "-{line}");
    }
    for line in &new[prefix..new_end] {
        let _ = writeln!(out, "+{line}");
    }
    for line in &old[old_end..ctx_end] {
        let _ = writeln!(out, " {line}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_file_diff_is_all_additions() {
        let diff = unified_diff("deployment/5-companyz.tf", "", "a\nb\n");
        assert!(diff.starts_with("--- /dev/null\n+++ b/deployment/5-companyz.tf\n"));
        assert!(diff.contains("@@ -0,0 +1,2 @@"));
        assert!(diff.contains("+a\n+b\n"));
    }

    #[test]
    fn insertion_diff_carries_context_and_no_removals() {
        let before = "one\ntwo\nthree\nfour\nfive\nsix\n";
        let after = "one\ntwo\nthree\nNEW\nfour\nfive\nsix\n";
        let diff = unified_diff("f", before, after);
        assert!(diff.contains("+NEW\n"));
        assert!(!diff.contains("\n-"), "pure insertion must not remove lines");
        assert!(diff.contains(" three\n"), "context before insertion");
        assert!(diff.contains(" four\n"), "context after insertion");
        assert!(diff.contains("@@ -1,6 +1,7 @@"));
    }

    #[test]
    fn appended_lines_diff_at_eof() {
        let before = "a\nb\n";
        let after = "a\nb\n\nnew block\n";
        let diff = unified_diff("variables.tf", before, after);
        assert!(diff.contains("+new block\n"));
        assert!(!diff.contains("\n-"), "append must be additions only: {diff}");
    }
}
