//! Validation results.

use indexmap::IndexSet;
use serde::Serialize;

/// Result of one [`validate`](crate::validate) call.
///
/// `errors` is `None` when the data satisfies every rule. Otherwise it holds
/// each distinct message once, in the order first produced.
///
/// Serializes as `{}` or `{"errors": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ValidationOutcome {
    /// Builds an outcome from raw messages, dropping repeats.
    #[must_use]
    pub fn from_messages<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let unique: IndexSet<String> = messages.into_iter().collect();
        if unique.is_empty() {
            Self::default()
        } else {
            Self {
                errors: Some(unique.into_iter().collect()),
            }
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_none()
    }

    /// Messages in order, empty when valid.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        self.errors.as_deref().unwrap_or_default()
    }
}
