use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Suffix appended to a contract name to form its template variable.
pub const ADDRESS_SUFFIX: &str = "Address";

/// Contracts produced by the IBC deployment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    IBCHost,
    IBCHandler,
    IBCIdentifier,
    TendermintLightClient,
}

impl Contract {
    pub const ALL: [Contract; 4] = [
        Contract::IBCHost,
        Contract::IBCHandler,
        Contract::IBCIdentifier,
        Contract::TendermintLightClient,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Contract::IBCHost => "IBCHost",
            Contract::IBCHandler => "IBCHandler",
            Contract::IBCIdentifier => "IBCIdentifier",
            Contract::TendermintLightClient => "TendermintLightClient",
        }
    }

    /// Name under which the contract address is visible to templates,
    /// e.g. `IBCHostAddress`.
    pub fn variable(&self) -> String {
        format!("{}{}", self.name(), ADDRESS_SUFFIX)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{contract} is not deployed on any network")]
    NotDeployed { contract: String },

    #[error("{contract} is deployed on {count} networks, a network id is required")]
    AmbiguousNetwork { contract: String, count: usize },

    #[error("{contract} has no deployment on network {network}")]
    MissingNetwork { contract: String, network: String },

    #[error("{contract} deployment on network {network} has no address")]
    MissingAddress { contract: String, network: String },
}

/// Named contract addresses handed to the templates. Built once and never
/// modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AddressSet {
    entries: BTreeMap<String, String>,
}

impl AddressSet {
    pub fn builder() -> AddressSetBuilder {
        AddressSetBuilder::default()
    }

    /// Resolves every [`Contract`] from the deployment artifacts in `dir`.
    pub fn from_artifacts(dir: &Path, network: Option<&str>) -> Result<Self, ArtifactError> {
        let mut builder = Self::builder();
        for contract in Contract::ALL {
            let address = resolve_address(dir, contract.name(), network)?;
            tracing::debug!(contract = contract.name(), %address, "resolved contract address");
            builder = builder.contract(contract, address);
        }
        Ok(builder.build())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AddressSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AddressSet {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct AddressSetBuilder {
    entries: BTreeMap<String, String>,
}

impl AddressSetBuilder {
    pub fn address<K, V>(mut self, name: K, address: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.entries.insert(name.into(), address.into());
        self
    }

    pub fn contract(self, contract: Contract, address: impl Into<String>) -> Self {
        self.address(contract.variable(), address)
    }

    /// Adds every entry of `other`, replacing entries with the same name.
    pub fn merge(mut self, other: AddressSet) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn build(self) -> AddressSet {
        AddressSet {
            entries: self.entries,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(default)]
    networks: BTreeMap<String, NetworkEntry>,
}

#[derive(Debug, Deserialize)]
struct NetworkEntry {
    address: Option<String>,
}

fn resolve_address(
    dir: &Path,
    contract: &str,
    network: Option<&str>,
) -> Result<String, ArtifactError> {
    let path = dir.join(format!("{contract}.json"));
    let contents = std::fs::read_to_string(&path).map_err(|source| ArtifactError::Read {
        path: path.clone(),
        source,
    })?;
    let artifact: Artifact =
        serde_json::from_str(&contents).map_err(|source| ArtifactError::Parse { path, source })?;

    let (network, entry) = match network {
        Some(id) => {
            let entry = artifact
                .networks
                .get(id)
                .ok_or_else(|| ArtifactError::MissingNetwork {
                    contract: contract.to_string(),
                    network: id.to_string(),
                })?;
            (id.to_string(), entry)
        }
        None => {
            let mut networks = artifact.networks.iter();
            match (networks.next(), artifact.networks.len()) {
                (Some((id, entry)), 1) => (id.clone(), entry),
                (None, _) => {
                    return Err(ArtifactError::NotDeployed {
                        contract: contract.to_string(),
                    });
                }
                (Some(_), count) => {
                    return Err(ArtifactError::AmbiguousNetwork {
                        contract: contract.to_string(),
                        count,
                    });
                }
            }
        }
    };

    entry
        .address
        .clone()
        .ok_or(ArtifactError::MissingAddress {
            contract: contract.to_string(),
            network,
        })
}
