//! Per-call evaluation settings.

use serde::{Deserialize, Serialize};

/// Quote style wrapped around every field label in generated messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Quotes {
    /// Labels are emitted bare: `age is required`.
    #[default]
    #[serde(rename = "none")]
    None,
    /// `'age' is required`
    #[serde(rename = "single-quotes")]
    Single,
    /// `"age" is required`
    #[serde(rename = "double-quotes")]
    Double,
    /// `` `age` is required ``
    #[serde(rename = "backtick")]
    Backtick,
}

impl Quotes {
    /// The quote character, if any.
    #[must_use]
    pub const fn mark(self) -> Option<char> {
        match self {
            Self::None => None,
            Self::Single => Some('\''),
            Self::Double => Some('"'),
            Self::Backtick => Some('`'),
        }
    }

    /// Wraps `label` in this quote style.
    #[must_use]
    pub fn wrap(self, label: &str) -> String {
        match self.mark() {
            Some(mark) => format!("{mark}{label}{mark}"),
            None => label.to_owned(),
        }
    }
}

/// Settings for one [`validate`](crate::validate) call.
///
/// Every field is optional when deserialized, so `{"strict": true}` is a
/// complete configuration.
///
/// # Examples
///
/// ```
/// use nebula_rules::{Quotes, ValidatorConfig};
///
/// let config = ValidatorConfig::new()
///     .with_quotes(Quotes::Backtick)
///     .with_strict(true);
/// assert!(config.strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Quote style for field labels.
    pub quotes: Quotes,
    /// Report data keys that no rule declares.
    pub strict: bool,
}

impl ValidatorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_quotes(mut self, quotes: Quotes) -> Self {
        self.quotes = quotes;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Wraps `label` in the configured quote style.
    #[must_use]
    pub fn label(&self, label: &str) -> String {
        self.quotes.wrap(label)
    }
}
