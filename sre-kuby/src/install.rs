use std::{fs, path::Path};

use anyhow::Context as _;

/// Backs up `active` to `backup`, then replaces it with `generated`.
///
/// Returns whether a backup was written; there is nothing to back up on a
/// machine without a kube config yet.
pub fn install(generated: &Path, active: &Path, backup: &Path) -> anyhow::Result<bool> {
    let backed_up = if active.exists() {
        fs::copy(active, backup).with_context(|| {
            format!("Backing up {} to {}", active.display(), backup.display())
        })?;
        log::info!("backed up {} to {}", active.display(), backup.display());
        true
    } else {
        log::info!("no {} yet, nothing to back up", active.display());
        false
    };

    fs::copy(generated, active)
        .with_context(|| format!("Copying {} to {}", generated.display(), active.display()))?;
    Ok(backed_up)
}
