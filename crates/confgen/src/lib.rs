use addresses::AddressSet;

mod error;
mod observer;
mod pairs;
mod renderer;

pub use error::ConfigError;
pub use observer::{LogObserver, NoOpObserver, RenderObserver};
pub use pairs::{RenderPair, SEPARATOR};
pub use renderer::ConfigRenderer;

/// Environment variable holding the flattened pair list.
pub const CONF_TPL_ENV: &str = "CONF_TPL";

/// Renders every pair with `addresses`, stopping at the first error.
pub fn run(addresses: AddressSet, pairs: &[RenderPair]) -> Result<(), ConfigError> {
    ConfigRenderer::new(addresses).run(pairs)
}

/// Parses a `NAME=VALUE` address argument.
pub fn parse_address(argument: &str) -> Result<(String, String), ConfigError> {
    match argument.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => Err(ConfigError::InvalidAddressArgument {
            argument: argument.to_string(),
        }),
    }
}
