use std::io;

use clap::Parser;

use sre_kuby::{auth::HelperCommand, probe::TlsProbe, run, Cli, Config};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_cli(cli, kubeconf::kube_dir()?)?;

    let auth = HelperCommand::new(config.auth_command.as_str());
    let probe = TlsProbe::new()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    run(&config, &auth, &probe, &mut input, &mut out)?;

    Ok(())
}
