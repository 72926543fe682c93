use addresses::AddressSet;
use std::{fs, path::Path};
use template::Template;

use crate::{ConfigError, LogObserver, RenderObserver, RenderPair};

/// Renders templates with a fixed set of contract addresses.
pub struct ConfigRenderer {
    addresses: AddressSet,
}

impl ConfigRenderer {
    pub fn new(addresses: AddressSet) -> Self {
        Self { addresses }
    }

    /// Generates every pair in order, logging each written file.
    ///
    /// Stops at the first failure. Outputs written before it are left in
    /// place.
    pub fn run(&self, pairs: &[RenderPair]) -> Result<(), ConfigError> {
        self.run_with_observer(pairs, &mut LogObserver::new())
    }

    pub fn run_with_observer<O: RenderObserver>(
        &self,
        pairs: &[RenderPair],
        observer: &mut O,
    ) -> Result<(), ConfigError> {
        for pair in pairs {
            self.generate(pair)?;
            observer.generated(pair);
        }
        observer.finish();
        Ok(())
    }

    /// Reads the template at `path` and renders it.
    pub fn render(&self, path: &Path) -> Result<String, ConfigError> {
        let source =
            fs::read_to_string(path).map_err(|source| ConfigError::TemplateReadFailure {
                path: path.to_path_buf(),
                source,
            })?;

        Template::compile(&source)
            .and_then(|template| template.render(&self.addresses))
            .map_err(|cause| ConfigError::RenderFailure {
                path: path.to_path_buf(),
                cause,
            })
    }

    fn generate(&self, pair: &RenderPair) -> Result<(), ConfigError> {
        let rendered = self.render(&pair.template)?;
        fs::write(&pair.output, rendered).map_err(|cause| ConfigError::WriteFailure {
            path: pair.output.clone(),
            cause,
        })
    }
}
