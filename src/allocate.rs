//! Identifier allocation — next BPN and next resource-file number.

use crate::error::{OnboardError, Result};
use crate::org::Bpn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Numeric-prefix convention of per-organization resource files
/// (`2-companyx.tf`, `3-companyy.tf`).
static NUMBERED_TF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-.*\.tf$").expect("static regex"));

/// Allocate the next BPN: numeric max of the existing suffixes plus one.
///
/// Deterministic and independent of iteration order. Gaps are never reused:
/// a retired identifier may still be referenced by records deleted
/// out-of-band, so only strictly-greater suffixes are safe.
pub fn next_bpn(existing: impl Iterator<Item = u64>) -> Bpn {
    let next = existing.max().unwrap_or(0) + 1;
    Bpn::from_suffix(next)
}

/// Allocate the next numeric prefix for the new organization's resource
/// file. Starts at 2 (1 is the dataspace authority); the seed-data file's
/// own number is skipped if allocation would land on it.
pub fn next_file_number(deployment_dir: &Path) -> Result<u32> {
    let mut max = 0u32;
    let entries =
        fs::read_dir(deployment_dir).map_err(|e| OnboardError::io(deployment_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| OnboardError::io(deployment_dir, e))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(caps) = NUMBERED_TF.captures(name) {
            if let Ok(n) = caps[1].parse::<u32>() {
                max = max.max(n);
            }
        }
    }

    let mut next = if max == 0 { 2 } else { max + 1 };
    if next == 4 && deployment_dir.join("4-seed_data.tf").exists() {
        next = 5;
    }
    debug!(next, "resource file number allocated");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn bpn_allocation_is_numeric_max_plus_one() {
        // {5, 7, 3} -> 8, never a reused gap like 4 or 6.
        let bpn = next_bpn([5u64, 7, 3].into_iter());
        assert_eq!(bpn.as_str(), "BPNL000000000008");
    }

    #[test]
    fn bpn_allocation_is_order_independent() {
        let a = next_bpn([3u64, 7, 5].into_iter());
        let b = next_bpn([7u64, 5, 3].into_iter());
        assert_eq!(a, b);
    }

    #[test]
    fn first_bpn_when_registry_empty() {
        assert_eq!(next_bpn(std::iter::empty()).as_str(), "BPNL000000000001");
    }

    #[test]
    fn file_number_skips_seed_data_slot() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("2-companyx.tf"), "").unwrap();
        fs::write(dir.path().join("3-companyy.tf"), "").unwrap();
        fs::write(dir.path().join("4-seed_data.tf"), "").unwrap();
        // max is 4 (seed data itself), so allocation lands on 5 directly.
        assert_eq!(next_file_number(dir.path()).unwrap(), 5);
    }

    #[test]
    fn file_number_starts_at_two_in_fresh_corpus() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("variables.tf"), "").unwrap();
        assert_eq!(next_file_number(dir.path()).unwrap(), 2);
    }

    #[test]
    fn file_number_lands_on_five_after_seed_slot() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("3-companyx.tf"), "").unwrap();
        fs::write(dir.path().join("4-seed_data.tf"), "").unwrap();
        assert_eq!(next_file_number(dir.path()).unwrap(), 5);
    }
}
