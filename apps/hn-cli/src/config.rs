//! Optional YAML settings file for `convert`.
//!
//! ```yaml
//! indent: 4
//! compact: false
//! invalid_records: skip
//! ```

use std::path::Path;

use hn_inp::{InvalidRecordPolicy, ParseOptions};
use hn_json::Indent;
use serde::Deserialize;

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub indent: usize,
    pub compact: bool,
    pub invalid_records: InvalidRecordPolicy,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            compact: false,
            invalid_records: InvalidRecordPolicy::Abort,
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn indent(&self) -> Indent {
        if self.compact {
            Indent::Compact
        } else {
            Indent::Spaces(self.indent)
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            invalid_records: self.invalid_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = CliConfig::from_yaml("{}").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.indent(), Indent::Spaces(2));
        assert_eq!(config.parse_options(), ParseOptions::default());
    }

    #[test]
    fn reads_all_keys() {
        let config = CliConfig::from_yaml("indent: 4\ninvalid_records: skip\n").unwrap();
        assert_eq!(config.indent(), Indent::Spaces(4));
        assert_eq!(config.parse_options(), ParseOptions::skip_invalid());

        let config = CliConfig::from_yaml("compact: true\n").unwrap();
        assert_eq!(config.indent(), Indent::Compact);
    }

    #[test]
    fn rejects_unknown_keys_and_policies() {
        assert!(CliConfig::from_yaml("indnet: 4\n").is_err());
        assert!(CliConfig::from_yaml("invalid_records: ignore\n").is_err());
    }
}
