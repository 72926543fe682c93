use addresses::AddressSet;
use clap::Parser;
use confgen::{ConfigError, RenderPair};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "confgen")]
#[command(about = "Render configuration templates with deployed contract addresses", long_about = None)]
struct Cli {
    /// Colon separated list of alternating output and template paths
    #[arg(long, env = "CONF_TPL", value_name = "OUT:TPL[:OUT:TPL...]")]
    conf_tpl: Option<String>,

    /// Directory holding the deployment artifacts (<Contract>.json)
    #[arg(long, env = "CONF_ARTIFACTS_DIR")]
    artifacts_dir: Option<PathBuf>,

    /// Network id to read from the artifacts, required if they hold more than one
    #[arg(long, env = "CONF_NETWORK_ID")]
    network_id: Option<String>,

    /// Explicit address, takes precedence over the artifacts
    #[arg(long = "address", value_name = "NAME=VALUE")]
    addresses: Vec<String>,
}

impl Cli {
    fn address_set(&self) -> Result<AddressSet, ConfigError> {
        let resolved = match &self.artifacts_dir {
            Some(dir) => AddressSet::from_artifacts(dir, self.network_id.as_deref())?,
            None => AddressSet::default(),
        };

        let explicit = self
            .addresses
            .iter()
            .map(|arg| confgen::parse_address(arg))
            .collect::<Result<AddressSet, _>>()?;

        Ok(AddressSet::builder().merge(resolved).merge(explicit).build())
    }
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let raw = cli
        .conf_tpl
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| ConfigError::MissingConfiguration {
            variable: confgen::CONF_TPL_ENV.to_string(),
        })?;
    let pairs = RenderPair::parse_list(raw)?;

    let addresses = cli.address_set()?;
    if addresses.is_empty() {
        tracing::warn!("no contract addresses given, use --artifacts-dir or --address");
    }
    tracing::debug!(addresses = addresses.len(), pairs = pairs.len(), "rendering");

    confgen::run(addresses, &pairs)?;

    Ok(())
}
