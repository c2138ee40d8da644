//! Artifact paths, fixed relative to the corpus root.
//!
//! All paths the tool reads or writes are resolved here; no other module
//! joins path components. `missing_required` mirrors the pre-flight check of
//! the deployment directory: the patched artifacts and the collection
//! template must already exist before a run is allowed to start.

use std::path::{Path, PathBuf};

/// Name of the template collection every new collection is derived from.
const COLLECTION_TEMPLATE: &str = "companyx.postman_collection.json";

/// Resolved locations of every artifact in the configuration corpus.
#[derive(Debug, Clone)]
pub struct DeploymentLayout {
    root: PathBuf,
}

impl DeploymentLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DeploymentLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn deployment_dir(&self) -> PathBuf {
        self.root.join("deployment")
    }

    /// Shared variable-declaration file (patched; registry source of truth).
    pub fn variables_tf(&self) -> PathBuf {
        self.deployment_dir().join("variables.tf")
    }

    /// Seed-data Terraform file. Not patched (the JSON seed is), but its
    /// numeric prefix is excluded from file-number allocation.
    pub fn seed_data_tf(&self) -> PathBuf {
        self.deployment_dir().join("4-seed_data.tf")
    }

    /// Participant seed consumed by the bootstrap job (patched).
    pub fn seed_json(&self) -> PathBuf {
        self.deployment_dir().join("assets/seed/mvds-seed.json")
    }

    /// Credential-generation script (patched).
    pub fn jwt_gen(&self) -> PathBuf {
        self.deployment_dir().join("assets/did/jwt-gen.py")
    }

    pub fn collections_dir(&self) -> PathBuf {
        self.root.join("data-sharing/api-collections")
    }

    pub fn collection_template(&self) -> PathBuf {
        self.collections_dir().join(COLLECTION_TEMPLATE)
    }

    /// Per-organization resource file, `deployment/{N}-{name}.tf` (created).
    pub fn org_tf(&self, file_number: u32, name: &str) -> PathBuf {
        self.deployment_dir().join(format!("{file_number}-{name}.tf"))
    }

    /// Per-organization API collection (created).
    pub fn collection_for(&self, name: &str) -> PathBuf {
        self.collections_dir()
            .join(format!("{name}.postman_collection.json"))
    }

    /// Required pre-existing artifacts, as paths relative to the root.
    /// An empty list means the layout is complete.
    pub fn missing_required(&self) -> Vec<String> {
        let required = [
            self.variables_tf(),
            self.seed_data_tf(),
            self.seed_json(),
            self.jwt_gen(),
            self.collection_template(),
        ];
        required
            .iter()
            .filter(|p| !p.exists())
            .map(|p| {
                p.strip_prefix(&self.root)
                    .unwrap_or(p)
                    .display()
                    .to_string()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_keyed_by_name() {
        let layout = DeploymentLayout::new("/srv/mvds");
        assert!(layout
            .org_tf(5, "companyz")
            .ends_with("deployment/5-companyz.tf"));
        assert!(layout
            .collection_for("companyz")
            .ends_with("data-sharing/api-collections/companyz.postman_collection.json"));
    }

    #[test]
    fn missing_required_lists_relative_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = DeploymentLayout::new(dir.path());
        let missing = layout.missing_required();
        assert_eq!(missing.len(), 5);
        assert!(missing.contains(&"deployment/variables.tf".to_string()));
    }
}
