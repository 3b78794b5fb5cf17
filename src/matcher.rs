//! URL matching against the provider table.
//!
//! Providers are checked in table order and, within a provider, patterns in
//! declared order. First match wins; there is no scoring.

use std::sync::Arc;

use crate::provider::{Provider, ProviderTable};

/// Capture groups of a successful URL match, indexed from 1.
///
/// Groups that did not take part in the match are stored as empty strings,
/// so their `{n}` placeholders are replaced with nothing. This includes
/// trailing optional groups, which PHP-style `preg_match` drops entirely and
/// whose placeholders it therefore leaves as literal `{n}` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<String>);

impl Captures {
    /// Collect groups `1..` from a regex match.
    pub fn from_regex(caps: &regex::Captures<'_>) -> Self {
        Self(
            caps.iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }

    /// Capture group `index` (1-based).
    pub fn get(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.0.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(index, value)` pairs with 1-based indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().enumerate().map(|(i, v)| (i + 1, v.as_str()))
    }
}

impl From<Vec<String>> for Captures {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

/// A provider selected for a URL.
#[derive(Debug, Clone)]
pub struct Match {
    pub provider: Arc<Provider>,
    /// Index of the matching pattern within the provider's pattern list.
    pub pattern_index: usize,
    pub captures: Captures,
}

/// Find the first provider whose pattern set matches `url`.
pub fn match_url(url: &str, providers: &ProviderTable) -> Option<Match> {
    for (position, provider) in providers.iter().enumerate() {
        for (pattern_index, pattern) in provider.patterns().iter().enumerate() {
            if let Some(caps) = pattern.captures(url) {
                tracing::debug!(
                    "Matched provider #{} pattern #{} ({}) for {}",
                    position,
                    pattern_index,
                    pattern.as_str(),
                    url
                );
                return Some(Match {
                    provider: Arc::clone(provider),
                    pattern_index,
                    captures: Captures::from_regex(&caps),
                });
            }
        }
    }
    tracing::debug!("No provider matched {}", url);
    None
}
