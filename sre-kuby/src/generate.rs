use std::{io::Write, path::Path};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use kubeconf::{ClusterSpec, ContextSpec, KubeConfig};

use crate::{probe::Probe, Config, KubyError, ServerSpec};

/// Picks the user new contexts are bound to. Placeholders from the helper
/// template don't count; with several real users the first name wins.
pub fn select_user(kc: &KubeConfig, source: &Path) -> Result<String, KubyError> {
    let mut users = kc.real_users();
    let user = users
        .next()
        .ok_or_else(|| KubyError::NoUsableUser(source.to_path_buf()))?
        .to_owned();

    let ignored: Vec<&str> = users.collect();
    if !ignored.is_empty() {
        log::warn!("several users in {}: using '{user}', ignoring {ignored:?}", source.display());
    }
    Ok(user)
}

/// Adds a cluster and a context named after `server` and makes it current.
///
/// With `ca_data` the cluster trusts exactly those certificates, otherwise
/// it skips TLS verification.
pub fn add_server(
    kc: &mut KubeConfig,
    server: &ServerSpec,
    port: u16,
    user: &str,
    ca_data: Option<String>,
) {
    let insecure = ca_data.is_none();
    kc.clusters.insert(
        server.name.clone(),
        ClusterSpec {
            server: server.url(port),
            certificate_authority_data: ca_data,
            insecure_skip_tls_verify: insecure.then_some(true),
            ..Default::default()
        },
    );
    kc.contexts.insert(
        server.name.clone(),
        ContextSpec {
            cluster: server.name.clone(),
            user: user.to_owned(),
            ..Default::default()
        },
    );
    kc.current_context = server.name.clone();
}

/// Probes every configured server in order and adds the reachable ones.
/// Skipped servers are reported on `out`. Returns the names that were added;
/// the last one is the current context.
pub fn add_reachable_servers(
    kc: &mut KubeConfig,
    config: &Config,
    user: &str,
    probe: &dyn Probe,
    out: &mut impl Write,
) -> anyhow::Result<Vec<String>> {
    let mut added = Vec::new();

    for server in &config.servers {
        let chain = match probe.fetch_chain(&server.host, config.port) {
            Ok(chain) => chain,
            Err(e) => {
                log::warn!("probing {} failed: {e:#}", server.host);
                writeln!(
                    out,
                    "Skip server '{}' because it wasn't reachable. ('{e}')",
                    server.host
                )?;
                continue;
            }
        };
        log::info!(
            "{} is reachable ({} certificate(s) presented)",
            server.host,
            chain.len()
        );

        let ca_data = if config.embed_ca && !chain.is_empty() {
            Some(STANDARD.encode(chain.to_pem()?))
        } else {
            if config.embed_ca {
                log::warn!(
                    "{} presented no certificates, skipping TLS verification instead",
                    server.host
                );
            }
            None
        };

        add_server(kc, server, config.port, user, ca_data);
        added.push(server.name.clone());
    }

    Ok(added)
}
