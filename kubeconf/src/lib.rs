pub mod clean;
pub mod direct;
pub mod loading;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

pub use clean::*;
pub use loading::LoadingRules;

/// `$HOME/.kube`
pub fn kube_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME is not set")?;
    Ok(Path::new(&home).join(".kube"))
}
