//! Configuration file support (`.docbook-rst.toml`)
//!
//! Precedence order (highest to lowest):
//! 1. Command-line arguments
//! 2. Project config (`./.docbook-rst.toml`)
//! 3. User config (`~/.docbook-rst.toml`)
//! 4. Built-in defaults
//!
//! `--config <FILE>` replaces discovery of both files.

use crate::verify::{Converter, GoldenCase};
use anyhow::{bail, Context, Result};
use docbook_rst_core::RstOptions;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in the home and working directories
pub const CONFIG_FILE_NAME: &str = ".docbook-rst.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for `docbook-to-rst`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert: Option<ConvertConfig>,

    /// Settings for `conversion-verify`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<VerifyConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Indent width for directive bodies and code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,

    /// Bullet character for itemized lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet: Option<char>,

    /// Section adornment characters, outermost first (e.g. `"=-~^"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_chars: Option<String>,

    /// Render the document title with an overline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_overline: Option<bool>,

    /// Reject non-DocBook root elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Converter executable or script
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converter: Option<PathBuf>,

    /// Interpreter used to run the converter script
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<PathBuf>,

    /// Kill the converter after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Runs per case for the determinism check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runs: Option<usize>,

    /// Golden cases run when no input is given on the command line
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cases: Vec<VerifyCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerifyCase {
    pub input: PathBuf,
    pub expected: PathBuf,
}

impl From<&VerifyCase> for GoldenCase {
    fn from(case: &VerifyCase) -> Self {
        Self::new(&case.input, &case.expected)
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML for this schema.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Find and load configuration files
    /// Returns (`user_config`, `project_config`)
    #[must_use = "returns the discovered configs"]
    pub fn discover_configs() -> (Option<Self>, Option<Self>) {
        let user_config =
            dirs::home_dir().and_then(|home| Self::load_optional(&home.join(CONFIG_FILE_NAME)));
        let project_config = Self::load_optional(Path::new(CONFIG_FILE_NAME));
        (user_config, project_config)
    }

    /// Load a config that may not exist; unreadable files are logged and skipped
    fn load_optional(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring config {}: {e:#}", path.display());
                None
            }
        }
    }

    /// Resolve the effective config: an explicit file, or user and project
    /// configs merged.
    ///
    /// # Errors
    ///
    /// Only an explicit `--config` file that fails to load is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => {
                let (user, project) = Self::discover_configs();
                Ok(Self::merge(user, project))
            }
        }
    }

    /// Merge multiple configs with precedence
    /// project config > user config > defaults
    #[must_use = "returns the merged config"]
    pub fn merge(user_config: Option<Self>, project_config: Option<Self>) -> Self {
        let mut merged = user_config.unwrap_or_default();
        let Some(project) = project_config else {
            return merged;
        };

        if let Some(convert) = project.convert {
            let mut merged_convert = merged.convert.unwrap_or_default();
            if convert.indent.is_some() {
                merged_convert.indent = convert.indent;
            }
            if convert.bullet.is_some() {
                merged_convert.bullet = convert.bullet;
            }
            if convert.heading_chars.is_some() {
                merged_convert.heading_chars = convert.heading_chars;
            }
            if convert.title_overline.is_some() {
                merged_convert.title_overline = convert.title_overline;
            }
            if convert.strict.is_some() {
                merged_convert.strict = convert.strict;
            }
            merged.convert = Some(merged_convert);
        }

        if let Some(verify) = project.verify {
            let mut merged_verify = merged.verify.unwrap_or_default();
            if verify.converter.is_some() {
                merged_verify.converter = verify.converter;
            }
            if verify.interpreter.is_some() {
                merged_verify.interpreter = verify.interpreter;
            }
            if verify.timeout_secs.is_some() {
                merged_verify.timeout_secs = verify.timeout_secs;
            }
            if verify.runs.is_some() {
                merged_verify.runs = verify.runs;
            }
            // Project cases replace the user's list
            if !verify.cases.is_empty() {
                merged_verify.cases = verify.cases;
            }
            merged.verify = Some(merged_verify);
        }

        merged
    }
}

impl ConvertConfig {
    /// Serializer options with config values applied over the defaults
    ///
    /// # Errors
    ///
    /// Fails on an empty `heading_chars` or a bullet other than `-`, `*`, `+`.
    pub fn to_rst_options(&self) -> Result<RstOptions> {
        let mut options = RstOptions::default();
        if let Some(indent) = self.indent {
            if indent == 0 {
                bail!("convert.indent must be at least 1");
            }
            options.indent = indent;
        }
        if let Some(bullet) = self.bullet {
            if !matches!(bullet, '-' | '*' | '+') {
                bail!("convert.bullet must be one of '-', '*' or '+', got {bullet:?}");
            }
            options.bullet = bullet;
        }
        if let Some(chars) = &self.heading_chars {
            let chars: Vec<char> = chars.chars().collect();
            if chars.is_empty()
                || chars
                    .iter()
                    .any(|c| c.is_alphanumeric() || c.is_whitespace())
            {
                bail!("convert.heading_chars must be non-empty punctuation");
            }
            options.heading_chars = chars;
        }
        if let Some(overline) = self.title_overline {
            options.title_overline = overline;
        }
        Ok(options)
    }
}

impl VerifyConfig {
    /// Build a converter from the config; `program` overrides `converter`.
    ///
    /// # Errors
    ///
    /// Fails when neither names a converter.
    pub fn converter(&self, program: Option<&Path>) -> Result<Converter> {
        let Some(program) = program.or(self.converter.as_deref()) else {
            bail!(
                "No converter given; pass --converter or set verify.converter in {CONFIG_FILE_NAME}"
            );
        };
        let mut converter = Converter::new(program);
        if let Some(interpreter) = &self.interpreter {
            converter = converter.with_interpreter(interpreter);
        }
        if let Some(secs) = self.timeout_secs {
            converter = converter.with_timeout(Duration::from_secs(secs));
        }
        Ok(converter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
[convert]
indent = 3
bullet = "*"
heading_chars = "#*="

[verify]
converter = "target/debug/docbook-to-rst"
timeout_secs = 30
runs = 3

[[verify.cases]]
input = "tests/fixtures/code-example.xml"
expected = "tests/fixtures/expected-code-example.rst"
"##;

    #[test]
    fn test_parse_sample() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let convert = config.convert.unwrap();
        assert_eq!(convert.indent, Some(3));
        assert_eq!(convert.bullet, Some('*'));

        let verify = config.verify.unwrap();
        assert_eq!(verify.runs, Some(3));
        assert_eq!(verify.cases.len(), 1);
        assert_eq!(
            GoldenCase::from(&verify.cases[0]).name(),
            "code-example"
        );
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_key_type_is_error() {
        assert!(toml::from_str::<Config>("[convert]\nindent = \"wide\"\n").is_err());
    }

    #[test]
    fn test_merge_project_overrides_user() {
        let user: Config = toml::from_str("[convert]\nindent = 2\nbullet = \"+\"\n").unwrap();
        let project: Config = toml::from_str("[convert]\nindent = 8\n").unwrap();

        let merged = Config::merge(Some(user), Some(project));
        let convert = merged.convert.unwrap();
        assert_eq!(convert.indent, Some(8));
        assert_eq!(convert.bullet, Some('+'));
    }

    #[test]
    fn test_merge_without_configs() {
        assert_eq!(Config::merge(None, None), Config::default());
    }

    #[test]
    fn test_to_rst_options() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let options = config.convert.unwrap().to_rst_options().unwrap();
        assert_eq!(options.indent, 3);
        assert_eq!(options.bullet, '*');
        assert_eq!(options.heading_chars, vec!['#', '*', '=']);
        assert!(options.title_overline);
    }

    #[test]
    fn test_invalid_rst_options() {
        let bad_bullet = ConvertConfig {
            bullet: Some('x'),
            ..ConvertConfig::default()
        };
        assert!(bad_bullet.to_rst_options().is_err());

        let bad_heading = ConvertConfig {
            heading_chars: Some(String::new()),
            ..ConvertConfig::default()
        };
        assert!(bad_heading.to_rst_options().is_err());
    }

    #[test]
    fn test_verify_converter() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let verify = config.verify.unwrap();

        let converter = verify.converter(None).unwrap();
        assert_eq!(converter.program(), Path::new("target/debug/docbook-to-rst"));
        assert_eq!(converter.timeout(), Some(Duration::from_secs(30)));

        let overridden = verify.converter(Some(Path::new("other"))).unwrap();
        assert_eq!(overridden.program(), Path::new("other"));

        assert!(VerifyConfig::default().converter(None).is_err());
    }
}
