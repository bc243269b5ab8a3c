//! Update executor
//!
//! Applies selected updates one at a time through the project's package
//! manager. A failing install is recorded and the batch continues.

use crate::domain::{ApplySummary, EcosystemDescriptor, FailedUpdate, PackageUpdateInfo};
use crate::error::ExecutorError;
use crate::package_manager::{detect_tool, PackageManager};
use std::path::Path;
use std::sync::Arc;

/// Options controlling an apply run
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Breaking updates may only run when this is set
    pub confirm_breaking: bool,
}

impl ApplyOptions {
    /// Options with breaking updates confirmed
    pub fn confirmed() -> Self {
        Self {
            confirm_breaking: true,
        }
    }
}

/// Runs package-manager installs for update records
pub struct Executor {
    package_manager: Arc<dyn PackageManager>,
}

impl Executor {
    /// Create an executor backed by a package manager
    pub fn new(package_manager: Arc<dyn PackageManager>) -> Self {
        Self { package_manager }
    }

    /// Apply `updates` in the project at `root`.
    ///
    /// Nothing runs when a breaking update is present and
    /// `options.confirm_breaking` is false. Records without a known latest
    /// version are skipped.
    pub async fn apply(
        &self,
        root: &Path,
        descriptor: &EcosystemDescriptor,
        updates: &[PackageUpdateInfo],
        options: ApplyOptions,
    ) -> Result<ApplySummary, ExecutorError> {
        if !options.confirm_breaking {
            let breaking: Vec<String> = updates
                .iter()
                .filter(|u| u.has_breaking_change)
                .map(|u| u.name.clone())
                .collect();
            if !breaking.is_empty() {
                return Err(ExecutorError::ConfirmationRequired { packages: breaking });
            }
        }

        let tool = detect_tool(descriptor.id, root);
        let mut summary = ApplySummary::default();

        for update in updates {
            if update.is_lookup_failure() {
                tracing::info!(package = %update.name, "skipping update without a known version");
                summary.skipped.push(update.name.clone());
                continue;
            }

            tracing::info!(
                package = %update.name,
                version = %update.latest_version,
                tool = %tool,
                "applying update"
            );
            let result = self
                .package_manager
                .install(tool, &update.name, &update.latest_version, root)
                .await;

            if result.success {
                summary.succeeded.push(update.name.clone());
            } else {
                let reason = result.reason();
                tracing::warn!(package = %update.name, reason = %reason, "update failed");
                summary.failed.push(FailedUpdate {
                    name: update.name.clone(),
                    reason,
                });
            }
        }

        Ok(summary)
    }
}
