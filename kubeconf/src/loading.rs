use std::path::PathBuf;

use anyhow::Context as _;

use crate::KubeConfig;

/// Loads several kubeconfig files into one, the way kubectl handles a
/// `KUBECONFIG` list: the first file to define a key wins, files that do not
/// exist are skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadingRules {
    pub precedence: Vec<PathBuf>,
}

impl LoadingRules {
    pub fn new(precedence: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            precedence: precedence.into_iter().map(Into::into).collect(),
        }
    }

    pub fn load(&self) -> anyhow::Result<KubeConfig> {
        let mut merged = KubeConfig::default();

        for path in &self.precedence {
            if !path.exists() {
                log::debug!("kubeconfig: skip (not found) {}", path.display());
                continue;
            }

            let mut kc = KubeConfig::read_from(path)
                .with_context(|| format!("Loading {}", path.display()))?;
            if let Some(dir) = path.parent() {
                kc.resolve_paths(dir);
            }
            log::debug!(
                "kubeconfig: loaded {} ({} context(s))",
                path.display(),
                kc.contexts.len()
            );

            merged.merge_from(kc);
        }

        Ok(merged)
    }
}
