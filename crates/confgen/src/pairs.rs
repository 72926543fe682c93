use crate::ConfigError;
use std::path::PathBuf;

/// Separator between the elements of a flattened pair list.
pub const SEPARATOR: char = ':';

/// One rendering job: `template` is rendered into `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPair {
    pub output: PathBuf,
    pub template: PathBuf,
}

impl RenderPair {
    pub fn new(output: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            template: template.into(),
        }
    }

    /// Parses `out1:tpl1:out2:tpl2`. The list must hold an even number of
    /// elements. Empty elements are kept and fail once the pair is rendered.
    pub fn parse_list(raw: &str) -> Result<Vec<RenderPair>, ConfigError> {
        let elements: Vec<&str> = raw.split(SEPARATOR).collect();

        if elements.len() % 2 != 0 {
            return Err(ConfigError::MalformedPairList {
                reason: format!(
                    "expected alternating output and template paths, got {} elements",
                    elements.len()
                ),
            });
        }

        Ok(elements
            .chunks_exact(2)
            .map(|pair| RenderPair::new(pair[0], pair[1]))
            .collect())
    }
}
