//! orgadd — transactional organization onboarding for an MVDS configuration
//! corpus.
//!
//! Adds one tenant to a multi-file, cross-referencing set of deployment
//! artifacts: a per-organization resource file and API collection are
//! created, and the shared variable file, participant seed, and
//! credential-generation script are patched in place. All five writes are
//! one transaction: any failure restores every artifact to its pre-run
//! bytes.
//!
//! The tool is single-threaded and synchronous; it assumes exclusive access
//! to the corpus for the duration of a run (operator constraint, not
//! enforced by locking).

pub mod allocate;
pub mod error;
pub mod layout;
pub mod org;
pub mod patch;
pub mod registry;
pub mod render;
pub mod report;
pub mod run;
pub mod txn;
pub mod validate;

pub use error::{OnboardError, Result};
pub use layout::DeploymentLayout;
pub use org::{Bpn, OrganizationRecord};
pub use run::{onboard, OnboardRequest};
pub use txn::RunOutcome;
