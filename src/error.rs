// SPDX-License-Identifier: MIT

use std::path::PathBuf;

/// Failure taxonomy for an onboarding run.
///
/// Every variant maps to a distinct process exit code so operators and
/// wrapper scripts can branch on the failure class without parsing stderr.
/// Variants that can fire after mutation has begun (`AnchorNotFound`,
/// `AlreadyPatched`, `Io`) are only ever surfaced after the transaction has
/// restored every snapshot.
#[derive(Debug, thiserror::Error)]
pub enum OnboardError {
    /// Input or deployment layout failed a pre-flight check. Nothing touched.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Organization name or BPN already present in the registry. Nothing touched.
    #[error("organization already onboarded: {0}")]
    DuplicateOrganization(String),

    /// A generated-shape block in the variable file is missing mandatory
    /// fields. Skipping it silently could re-allocate a live BPN, so this is
    /// fatal and the operator must repair the file by hand.
    #[error("registry corrupt in {path}: {reason}", path = .path.display())]
    RegistryCorrupt { path: PathBuf, reason: String },

    /// The patcher could not unambiguously locate the insertion point.
    #[error("insertion anchor not found in {path}: {anchor}", path = .path.display())]
    AnchorNotFound { path: PathBuf, anchor: String },

    /// The target artifact already carries an entry for this organization.
    #[error("{path} already contains an entry for '{org}'", path = .path.display())]
    AlreadyPatched { path: PathBuf, org: String },

    #[error("{path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OnboardError {
    /// Process exit code for this failure class (0 is success, 2 is clap usage).
    pub fn exit_code(&self) -> u8 {
        match self {
            OnboardError::Validation { .. } => 3,
            OnboardError::DuplicateOrganization(_) => 4,
            OnboardError::RegistryCorrupt { .. } => 5,
            OnboardError::AnchorNotFound { .. } | OnboardError::AlreadyPatched { .. } => 6,
            OnboardError::Io { .. } => 1,
        }
    }

    /// Attach a path to a bare `std::io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OnboardError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = OnboardError> = std::result::Result<T, E>;
