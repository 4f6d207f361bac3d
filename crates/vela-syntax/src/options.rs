//! Syntax configuration (the `[syntax]` table of `vela.toml`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::token::KEYWORDS;

/// Errors that can occur while loading syntax options
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Options that change how source text is lexed and parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxOptions {
    /// Columns a tab advances indentation to (default: 4)
    pub tab_width: usize,

    /// Maximum nesting depth of expressions and blocks (default: 48).
    /// Each bracket, block, call argument, prefix operator and
    /// right-associative operand is one level.
    pub max_depth: usize,

    /// Identifiers lexed as custom keywords without an `@` marker
    pub custom_keywords: Vec<String>,
}

impl Default for SyntaxOptions {
    fn default() -> Self {
        Self {
            tab_width: 4,
            max_depth: 48,
            custom_keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    syntax: SyntaxOptions,
}

#[derive(Serialize)]
struct ConfigFileRef<'a> {
    syntax: &'a SyntaxOptions,
}

impl SyntaxOptions {
    /// Load options from a `vela.toml` file
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse options from the `[syntax]` table of a TOML document.
    ///
    /// A document without a `[syntax]` table yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, OptionsError> {
        let config: ConfigFile = toml::from_str(content)?;
        config.syntax.validate()?;
        Ok(config.syntax)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.tab_width == 0 {
            return Err(OptionsError::ValidationError(
                "tab_width must be at least 1".to_string(),
            ));
        }

        if self.max_depth == 0 {
            return Err(OptionsError::ValidationError(
                "max_depth must be at least 1".to_string(),
            ));
        }

        for keyword in &self.custom_keywords {
            if !is_valid_keyword(keyword) {
                return Err(OptionsError::ValidationError(format!(
                    "Invalid custom keyword: '{}'. Must be an identifier that is not a reserved word",
                    keyword
                )));
            }
        }

        Ok(())
    }

    /// Render the options as a `vela.toml` document.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&ConfigFileRef { syntax: self })
    }

    pub fn is_custom_keyword(&self, word: &str) -> bool {
        self.custom_keywords.iter().any(|k| k == word)
    }
}

fn is_valid_keyword(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || unicode_xid::UnicodeXID::is_xid_start(first))
        && chars.all(unicode_xid::UnicodeXID::is_xid_continue)
        && !KEYWORDS.contains_key(word)
}
