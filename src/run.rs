// SPDX-License-Identifier: MIT
//! One onboarding run, end to end: validate → allocate → render → apply.

use crate::allocate;
use crate::error::Result;
use crate::layout::DeploymentLayout;
use crate::org::OrganizationRecord;
use crate::registry::Registry;
use crate::render;
use crate::txn::{self, RunOutcome};
use crate::validate;
use std::path::Path;
use tracing::info;

/// Parameters of one invocation.
#[derive(Debug)]
pub struct OnboardRequest<'a> {
    pub org_name: &'a str,
    pub bpn: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub domain: &'a str,
    pub dry_run: bool,
}

/// Run the full onboarding flow against the corpus at `root`.
///
/// Nothing is written before validation and rendering complete; all writes
/// go through the transaction in [`txn::apply`].
pub fn onboard(root: &Path, req: &OnboardRequest<'_>) -> Result<(OrganizationRecord, RunOutcome)> {
    let layout = DeploymentLayout::new(root);
    validate::check_layout(&layout)?;

    let registry = Registry::scan(&layout.variables_tf())?;
    let explicit_bpn = validate::validate_request(&registry, req.org_name, req.bpn, req.domain)?;

    let bpn = match explicit_bpn {
        Some(bpn) => bpn,
        None => allocate::next_bpn(registry.bpn_suffixes()),
    };
    let record = OrganizationRecord::new(req.org_name, req.display_name, bpn, req.domain);
    info!(
        org = %record.name,
        bpn = %record.bpn,
        did = %record.participant_did(),
        "onboarding record resolved"
    );

    let file_number = allocate::next_file_number(&layout.deployment_dir())?;
    let fragments = render::render_all(&record, &layout, file_number)?;
    let outcome = txn::apply(&record, &fragments, req.dry_run)?;
    Ok((record, outcome))
}
