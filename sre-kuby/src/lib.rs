pub mod auth;
pub mod cli;
pub mod confirm;
mod error;
pub mod generate;
pub mod install;
pub mod merge;
pub mod probe;
pub mod report;
mod server;

use std::{
    fs,
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::Context as _;
use console::style;
use kubeconf::KubeConfig;

use auth::Authenticator;
pub use cli::{Cli, Config};
pub use error::KubyError;
use probe::Probe;
pub use server::ServerSpec;

/// What happened to the generated config at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The generated config replaced the active one.
    Installed {
        config: PathBuf,
        backup: Option<PathBuf>,
    },
    /// The user declined; the generated config is left where it was written.
    Kept { generated: PathBuf },
}

/// Login, probe, merge, and ask before installing the result.
///
/// Prompts and results go to `out`, answers are read from `input`.
pub fn run(
    config: &Config,
    auth: &dyn Authenticator,
    probe: &dyn Probe,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let auth_config = config.auth_config_path();
    if !auth_config.exists() {
        writeln!(
            out,
            "{}",
            style(format!(
                "The 'config_auth' file couldn't be found. Download the OIDC configuration \
                 for the clusters and put it in the '{}' folder.",
                config.kube_dir.display()
            ))
            .red()
        )?;
        return Err(KubyError::MissingAuthConfig(auth_config).into());
    }

    let helper_output = auth.authenticate(&auth_config)?;
    let generated_path = auth::stage_output(&helper_output)?;

    let mut kc = KubeConfig::read_from(&generated_path)?;
    if let Some(dir) = generated_path.parent() {
        kc.resolve_paths(dir);
    }
    let user = generate::select_user(&kc, &generated_path)?;

    log::info!(
        "servers {:?}",
        config
            .servers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    );
    let added = generate::add_reachable_servers(&mut kc, config, &user, probe, out)?;
    report::print_summary(out, &kc, &added)?;

    let active = config.kube_config_path();
    let backup = config.backup_path();

    merge::merge_into_file(kc, &active, &generated_path)?;

    if config.show_diff {
        let current = match fs::read_to_string(&active) {
            Ok(current) => current,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Reading {}", active.display()));
            }
        };
        let generated = fs::read_to_string(&generated_path)
            .with_context(|| format!("Reading {}", generated_path.display()))?;
        report::print_diff(out, &current, &generated)?;
    }

    let question = format!(
        "Do you want to overwrite the '{}'.\nThe original config will be saved in the '{}' file",
        active.display(),
        backup.display()
    );
    if !confirm::ask_for_confirmation(&question, input, out)? {
        writeln!(
            out,
            "The generated kubectl config location: '{}'.",
            generated_path.display()
        )?;
        return Ok(Outcome::Kept {
            generated: generated_path,
        });
    }

    let backup = if install::install(&generated_path, &active, &backup)? {
        writeln!(
            out,
            "Backup old kubectl config to this location: '{}'.",
            backup.display()
        )?;
        Some(backup)
    } else {
        None
    };

    Ok(Outcome::Installed {
        config: active,
        backup,
    })
}
