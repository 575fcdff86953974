use std::path::PathBuf;

use clap::Parser;

use crate::{KubyError, ServerSpec};

pub const DEFAULT_SERVERS: &[&str] = &[
    "dev:k8s-api-dev.example.de",
    "staging:k8s-api-staging.example.de",
    "phdp:k8s-api-prod.example.de",
];

pub const DEFAULT_API_PORT: u16 = 6443;

const BANNER: &str = r#"
	#    # #    # #####  #   #
	#   #  #    # #    #  # #
	####   #    # #####    #
	#  #   #    # #    #   #
	#   #  #    # #    #   #
	#    #  ####  #####    #
"#;

#[derive(Parser, Debug)]
#[clap(
    name = "sre-kuby",
    version,
    about = "An OpenID Connect authentication helper for Kubernetes",
    long_about = "sre-kuby generates your kube configuration from your OIDC login.",
    before_long_help = BANNER
)]
pub struct Cli {
    /// The k8s api servers to include in the config, as name:server
    /// (for example dev:k8s-api-dev.example.de)
    #[clap(short, long, value_name = "NAME:SERVER", default_values = DEFAULT_SERVERS)]
    pub servers: Vec<String>,

    /// Port the API servers listen on
    #[clap(long, default_value_t = DEFAULT_API_PORT)]
    pub port: u16,

    /// OIDC helper, run as `<COMMAND> auth -k ~/.kube/config_auth`
    #[clap(long, value_name = "COMMAND", default_value = "dexter")]
    pub auth_command: String,

    /// Store each server's certificate chain as certificate-authority-data
    /// instead of skipping TLS verification
    #[clap(long)]
    pub embed_ca: bool,

    /// Show what changes in ~/.kube/config before asking to overwrite it
    #[clap(long)]
    pub diff: bool,
}

/// Everything a run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct Config {
    pub kube_dir: PathBuf,
    pub servers: Vec<ServerSpec>,
    pub port: u16,
    pub auth_command: String,
    pub embed_ca: bool,
    pub show_diff: bool,
}

impl Config {
    /// Fails on the first malformed server, before anything touches the
    /// network.
    pub fn from_cli(cli: Cli, kube_dir: PathBuf) -> Result<Config, KubyError> {
        let servers = cli
            .servers
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<ServerSpec>, _>>()?;

        Ok(Config {
            kube_dir,
            servers,
            port: cli.port,
            auth_command: cli.auth_command,
            embed_ca: cli.embed_ca,
            show_diff: cli.diff,
        })
    }

    pub fn auth_config_path(&self) -> PathBuf {
        self.kube_dir.join("config_auth")
    }

    pub fn kube_config_path(&self) -> PathBuf {
        self.kube_dir.join("config")
    }

    pub fn backup_path(&self) -> PathBuf {
        self.kube_dir.join("config_bak")
    }
}
