use addresses::ArtifactError;
use std::path::PathBuf;
use template::TemplateError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("You must set environment variable '{variable}'")]
    MissingConfiguration { variable: String },

    #[error("invalid pair list: {reason}")]
    MalformedPairList { reason: String },

    #[error("failed to read template {}", .path.display())]
    TemplateReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render template {}", .path.display())]
    RenderFailure {
        path: PathBuf,
        #[source]
        cause: TemplateError,
    },

    #[error("failed to write {}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("failed to resolve contract addresses")]
    AddressResolution(#[from] ArtifactError),

    #[error("invalid address `{argument}`, expected NAME=VALUE")]
    InvalidAddressArgument { argument: String },
}
