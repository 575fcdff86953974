use std::path::Path;

use anyhow::Context as _;
use kubeconf::{KubeConfig, LoadingRules};
use tempfile::NamedTempFile;

/// Merges `generated` with the user's kubeconfig at `existing` and writes the
/// result to `target`. On conflicting names the generated entries win;
/// everything else in `existing` is carried over.
pub fn merge_into_file(
    generated: KubeConfig,
    existing: &Path,
    target: &Path,
) -> anyhow::Result<()> {
    // removed again when `temp` drops
    let temp = NamedTempFile::new().context("Creating temporary kube config")?;
    generated
        .write_to(temp.path())
        .context("Writing generated kube config")?;

    let rules = LoadingRules::new([temp.path(), existing]);
    let merged = rules.load().context("failed to merge configurations")?;

    merged
        .write_to(target)
        .context("failed to write merged configuration")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use kubeconf::ClusterSpec;

    use super::*;

    #[test]
    fn generated_entries_win() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("config");
        let target = dir.path().join("config_new");
        fs::write(
            &existing,
            concat!(
                "current-context: legacy\n",
                "clusters:\n",
                "- name: dev\n  cluster:\n    server: https://old-dev:6443\n",
                "- name: legacy\n  cluster:\n    server: https://legacy:6443\n",
            ),
        )
        .unwrap();

        let mut generated = KubeConfig::default();
        generated.clusters.insert(
            "dev".into(),
            ClusterSpec {
                server: "https://dev:6443".into(),
                ..Default::default()
            },
        );
        generated.current_context = "dev".into();

        merge_into_file(generated, &existing, &target).unwrap();

        let merged = KubeConfig::read_from(&target).unwrap();
        assert_eq!(merged.clusters["dev"].server, "https://dev:6443");
        assert_eq!(merged.clusters["legacy"].server, "https://legacy:6443");
        assert_eq!(merged.current_context, "dev");
    }

    #[test]
    fn missing_existing_config_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config_new");
        let generated = KubeConfig {
            current_context: "dev".into(),
            ..Default::default()
        };

        merge_into_file(generated, &dir.path().join("config"), &target).unwrap();

        assert_eq!(KubeConfig::read_from(&target).unwrap().current_context, "dev");
    }
}
