use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;

use crate::KubyError;

/// Name of the working copy the helper output is turned into.
pub const GENERATED_FILE: &str = "config_new";

/// The OIDC login step.
pub trait Authenticator {
    /// Logs in using the helper configuration at `auth_config` and returns
    /// the kubeconfig the helper wrote its credentials to.
    fn authenticate(&self, auth_config: &Path) -> anyhow::Result<PathBuf>;
}

/// An external helper run as `<program> auth -k <auth_config>`, dexter style.
///
/// `-k` names the kubeconfig the helper reads its client settings from and
/// writes the token back into, so the output lands in `auth_config` itself.
#[derive(Debug, Clone)]
pub struct HelperCommand {
    pub program: String,
}

impl HelperCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Authenticator for HelperCommand {
    fn authenticate(&self, auth_config: &Path) -> anyhow::Result<PathBuf> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("auth").arg("-k").arg(auth_config);
        log::info!("running {cmd:?}");

        // stdio is inherited: the helper talks to the user and opens a browser.
        let status = cmd
            .status()
            .with_context(|| format!("Starting auth helper `{}`", self.program))?;
        if !status.success() {
            return Err(KubyError::AuthHelperFailed {
                program: self.program.clone(),
                status,
            }
            .into());
        }

        Ok(auth_config.to_path_buf())
    }
}

/// Copies the helper output next to itself as `config_new` and returns the
/// copy's path. The copy is what gets edited; the helper's file stays as is.
pub fn stage_output(helper_output: &Path) -> anyhow::Result<PathBuf> {
    let dir = helper_output.parent().unwrap_or_else(|| Path::new("."));
    let generated = dir.join(GENERATED_FILE);
    fs::copy(helper_output, &generated).with_context(|| {
        format!(
            "Copying {} to {}",
            helper_output.display(),
            generated.display()
        )
    })?;
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_output_copies_next_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let auth = dir.path().join("config_auth");
        fs::write(&auth, "current-context: dev\n").unwrap();

        let generated = stage_output(&auth).unwrap();

        assert_eq!(generated, dir.path().join("config_new"));
        assert_eq!(fs::read_to_string(generated).unwrap(), "current-context: dev\n");
    }

    #[cfg(unix)]
    #[test]
    fn helper_success_returns_its_kube_config() {
        let helper = HelperCommand::new("true");
        let path = Path::new("/nonexistent/config_auth");

        assert_eq!(helper.authenticate(path).unwrap(), path);
    }

    #[cfg(unix)]
    #[test]
    fn helper_failure_is_reported() {
        let err = HelperCommand::new("false")
            .authenticate(Path::new("config_auth"))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KubyError>(),
            Some(KubyError::AuthHelperFailed { program, .. }) if program == "false"
        ));
    }

    #[test]
    fn missing_helper_is_an_error() {
        let helper = HelperCommand::new("sre-kuby-test-no-such-helper");

        assert!(helper.authenticate(Path::new("config_auth")).is_err());
    }
}
