//! Parser configuration.
//!
//! Controls the definition syntax and the two behaviors that differ between
//! help-file dialects: the property alias table and the rule that rejects
//! explicit default values.
//!
//! # Example YAML
//!
//! ```yaml
//! syntax:
//!   definition_start: "${"
//!   definition_end: "}$"
//!   separator: "|"
//! dialect: classic
//! default_rule: non_zero_minimum
//! require_help_option: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default token opening a definition.
pub const DEFAULT_DEFINITION_START: &str = "${";
/// Default token closing a definition.
pub const DEFAULT_DEFINITION_END: &str = "}$";
/// Default property separator.
pub const DEFAULT_SEPARATOR: &str = "|";

/// Errors loading, saving or validating a [`ParserConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The configuration is readable but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tokens delimiting definitions in a help file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Syntax {
    /// Opens a definition (`${`).
    pub definition_start: String,
    /// Closes a definition (`}$`).
    pub definition_end: String,
    /// Separates the visible text and the properties (`|`).
    pub separator: String,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            definition_start: DEFAULT_DEFINITION_START.to_string(),
            definition_end: DEFAULT_DEFINITION_END.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// Which property alias table is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PropertyDialect {
    /// Run-together key spellings (`DelimiterCount`, `ValueType`, `Member`)
    /// and the short forms `del`, `delcount`, `cond`, `vtype`.
    #[default]
    Classic,
    /// Snake-case key spellings (`delimiter_count`, `member_name`) and the
    /// short forms `mem`, `metavar`, `sep`, `sepcount`, `val`, `vals`.
    Extended,
}

/// When an explicit `Default` property is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum DefaultValueRule {
    /// Reject a default when the member's minimum count is non-zero.
    #[default]
    NonZeroMinimum,
    /// Reject a default when the member's kind is `list`.
    ListKind,
}

/// Complete parser configuration.
///
/// # Examples
///
/// ```
/// use helpspec_core::{DefaultValueRule, ParserConfig, PropertyDialect};
///
/// let config = ParserConfig::default();
/// assert_eq!(config.syntax.definition_start, "${");
/// assert_eq!(config.dialect, PropertyDialect::Classic);
/// assert_eq!(config.default_rule, DefaultValueRule::NonZeroMinimum);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub syntax: Syntax,
    pub dialect: PropertyDialect,
    pub default_rule: DefaultValueRule,
    /// Fail when the document has no `help` member.
    pub require_help_option: bool,
}

impl ParserConfig {
    /// Loads configuration from a YAML file and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// [`YamlError`](ConfigError::YamlError) if parsing fails, or
    /// [`Invalid`](ConfigError::Invalid) if the tokens are unusable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be
    /// written, or [`YamlError`](ConfigError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks that the definition tokens are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Invalid`](ConfigError::Invalid) when a token is empty or
    /// the start and end tokens are equal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let syntax = &self.syntax;
        for (name, token) in [
            ("definition_start", &syntax.definition_start),
            ("definition_end", &syntax.definition_end),
            ("separator", &syntax.separator),
        ] {
            if token.is_empty() {
                return Err(ConfigError::Invalid(format!("{name} can't be empty")));
            }
        }
        if syntax.definition_start == syntax.definition_end {
            return Err(ConfigError::Invalid(
                "definition_start and definition_end must differ".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ParserConfig =
            serde_yaml::from_str("dialect: extended\ndefault_rule: list_kind\n").unwrap();
        assert_eq!(config.dialect, PropertyDialect::Extended);
        assert_eq!(config.default_rule, DefaultValueRule::ListKind);
        assert_eq!(config.syntax, Syntax::default());
        assert!(!config.require_help_option);
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("helpspec.yaml");

        let mut config = ParserConfig::default();
        config.syntax.definition_start = "{{".to_string();
        config.syntax.definition_end = "}}".to_string();
        config.require_help_option = true;
        config.save(&path).unwrap();

        let loaded = ParserConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validate_rejects_empty_and_equal_tokens() {
        let mut config = ParserConfig::default();
        config.syntax.separator.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ParserConfig::default();
        config.syntax.definition_end = "${".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
