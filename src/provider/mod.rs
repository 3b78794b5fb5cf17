//! Provider definitions and the provider table.
//!
//! A [`Provider`] recognizes URLs of one media source through an ordered list
//! of regular expressions and describes the markup to embed it as a template
//! tree. Providers are validated when they are built, so a table that exists
//! is always renderable.
//!
//! # Configuration
//!
//! Tables are usually loaded from TOML:
//!
//! ```toml
//! [[providers]]
//! url = ["youtube\\.com/watch\\?v=([A-Za-z0-9_-]+)", "youtu\\.be/([A-Za-z0-9_-]+)"]
//!
//! [providers.info]
//! name = "YouTube"
//! url = "https://youtube.com"
//!
//! [providers.render]
//! sizeRatio = 1.77
//!
//! [providers.render.iframe]
//! src = "https://www.youtube.com/embed/{1}"
//! width = 560
//! height = 315
//! ```
//!
//! `url` may also be a single string.

pub mod config;

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, ProviderError, Result};
use crate::matcher::{match_url, Match};
use crate::session::EmbedSession;
use crate::template::{TemplateMap, TemplateNode};

pub use config::{config_path, ProvidersFile};

/// Enrichment hook run by [`EmbedSession::parse_data`].
pub type DataCallback = Arc<dyn Fn(&EmbedSession) -> serde_json::Value + Send + Sync>;

/// Raw provider record as found in configuration files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// URL regex patterns, tried in order.
    #[serde(deserialize_with = "one_or_many")]
    pub url: Vec<String>,
    #[serde(default)]
    pub info: TemplateMap,
    #[serde(default)]
    pub render: TemplateMap,
}

impl ProviderConfig {
    /// Config with the given patterns and empty templates.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            url: patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(pattern) => vec![pattern],
        OneOrMany::Many(patterns) => patterns,
    })
}

/// A validated provider with compiled URL patterns.
#[derive(Clone)]
pub struct Provider {
    sources: Vec<String>,
    patterns: Vec<Regex>,
    info: TemplateMap,
    render: TemplateMap,
    size_ratio: Option<f64>,
    data_callback: Option<DataCallback>,
}

impl Provider {
    /// Compile and validate a provider record.
    ///
    /// Patterns are matched case-insensitively, in multi-line mode, with
    /// Unicode support.
    pub fn new(config: ProviderConfig) -> std::result::Result<Self, ProviderError> {
        if config.url.is_empty() {
            return Err(ProviderError::NoPatterns);
        }

        let patterns = config
            .url
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .multi_line(true)
                    .unicode(true)
                    .build()
                    .map_err(|source| ProviderError::InvalidPattern {
                        pattern: p.clone(),
                        source,
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        check_render_shape(&config.render)?;
        let size_ratio = read_size_ratio(&config.render)?;

        Ok(Self {
            sources: config.url,
            patterns,
            info: config.info,
            render: config.render,
            size_ratio,
            data_callback: None,
        })
    }

    /// Attach an enrichment callback, invoked by [`EmbedSession::parse_data`].
    #[must_use]
    pub fn with_data_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&EmbedSession) -> serde_json::Value + Send + Sync + 'static,
    {
        self.data_callback = Some(Arc::new(callback));
        self
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Pattern sources as configured.
    pub fn pattern_sources(&self) -> &[String] {
        &self.sources
    }

    /// Unsubstituted `info` template.
    pub fn info(&self) -> &TemplateMap {
        &self.info
    }

    /// Unsubstituted `render` template.
    pub fn render(&self) -> &TemplateMap {
        &self.render
    }

    /// Width / height aspect ratio.
    pub fn size_ratio(&self) -> Option<f64> {
        self.size_ratio
    }

    pub fn data_callback(&self) -> Option<&DataCallback> {
        self.data_callback.as_ref()
    }

    /// Whether any pattern matches `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(url))
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("patterns", &self.sources)
            .field("info", &self.info)
            .field("render", &self.render)
            .field("size_ratio", &self.size_ratio)
            .field("data_callback", &self.data_callback.is_some())
            .finish()
    }
}

fn check_render_shape(render: &TemplateMap) -> std::result::Result<(), ProviderError> {
    for key in ["iframe", "object", "script"] {
        if matches!(render.get(key), Some(TemplateNode::Leaf(_))) {
            return Err(ProviderError::NotAMap(key));
        }
    }

    if let Some(object) = render.get("object").and_then(TemplateNode::as_map) {
        for (key, path) in [
            ("attributes", "object.attributes"),
            ("params", "object.params"),
            ("embed", "object.embed"),
        ] {
            if matches!(object.get(key), Some(TemplateNode::Leaf(_))) {
                return Err(ProviderError::NotAMap(path));
            }
        }
    }

    Ok(())
}

fn read_size_ratio(render: &TemplateMap) -> std::result::Result<Option<f64>, ProviderError> {
    let ratio = match render.get("sizeRatio") {
        None => None,
        Some(TemplateNode::Leaf(value)) => match value.as_f64() {
            Some(r) if r.is_finite() && r > 0.0 => Some(r),
            _ => return Err(ProviderError::InvalidSizeRatio(value.to_string())),
        },
        Some(TemplateNode::Node(_)) => {
            return Err(ProviderError::InvalidSizeRatio("a map".to_string()))
        }
    };

    let renders_box = render.contains_key("iframe") || render.contains_key("object");
    if ratio.is_none() && renders_box {
        return Err(ProviderError::MissingSizeRatio);
    }

    Ok(ratio)
}

/// Ordered, read-only list of providers.
///
/// Cheap to share between sessions behind an [`Arc`].
#[derive(Debug, Clone, Default)]
pub struct ProviderTable {
    providers: Vec<Arc<Provider>>,
}

impl ProviderTable {
    /// Validate every record, failing on the first defect.
    pub fn new(configs: Vec<ProviderConfig>) -> Result<Self> {
        let providers = configs
            .into_iter()
            .enumerate()
            .map(|(index, config)| {
                Provider::new(config)
                    .map(Arc::new)
                    .map_err(|source| ConfigError::Provider { index, source })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Installed {} providers", providers.len());
        Ok(Self { providers })
    }

    /// Table from already-built providers.
    pub fn from_providers(providers: Vec<Provider>) -> Self {
        Self {
            providers: providers.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn providers(&self) -> &[Arc<Provider>] {
        &self.providers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Provider>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First provider matching `url`, with its captures.
    pub fn find(&self, url: &str) -> Option<Match> {
        match_url(url, self)
    }
}

impl<'a> IntoIterator for &'a ProviderTable {
    type Item = &'a Arc<Provider>;
    type IntoIter = std::slice::Iter<'a, Arc<Provider>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml_str: &str) -> ProviderConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn single_pattern_becomes_one_element_list() {
        let c = config(
            r#"
url = "example\\.com/(\\d+)"
"#,
        );
        assert_eq!(c.url, vec![r"example\.com/(\d+)"]);
    }

    #[test]
    fn pattern_list_keeps_order() {
        let c = config(
            r#"
url = ["a\\.com", "b\\.com"]
"#,
        );
        assert_eq!(c.url, vec![r"a\.com", r"b\.com"]);
    }

    #[test]
    fn rejects_invalid_regex() {
        let err = Provider::new(ProviderConfig::new(["[invalid"])).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_empty_pattern_list() {
        let err = Provider::new(ProviderConfig::new(Vec::<String>::new())).unwrap_err();
        assert!(matches!(err, ProviderError::NoPatterns));
    }

    #[test]
    fn iframe_without_size_ratio_is_rejected() {
        let c = config(
            r#"
url = "x"
[render.iframe]
src = "y"
"#,
        );
        assert!(matches!(
            Provider::new(c).unwrap_err(),
            ProviderError::MissingSizeRatio
        ));
    }

    #[test]
    fn script_only_provider_needs_no_size_ratio() {
        let c = config(
            r#"
url = "gist\\.github\\.com/(\\w+)/(\\w+)"
[render.script]
src = "https://gist.github.com/{1}/{2}.js"
"#,
        );
        let provider = Provider::new(c).unwrap();
        assert_eq!(provider.size_ratio(), None);
    }

    #[test]
    fn non_positive_size_ratio_is_rejected() {
        let c = config(
            r#"
url = "x"
[render]
sizeRatio = 0
"#,
        );
        assert!(matches!(
            Provider::new(c).unwrap_err(),
            ProviderError::InvalidSizeRatio(_)
        ));
    }

    #[test]
    fn leaf_render_substructure_is_rejected() {
        let c = config(
            r#"
url = "x"
[render]
sizeRatio = 1.5
object = "oops"
"#,
        );
        assert!(matches!(
            Provider::new(c).unwrap_err(),
            ProviderError::NotAMap("object")
        ));

        let c = config(
            r#"
url = "x"
[render]
sizeRatio = 1.5
[render.object]
params = 3
"#,
        );
        assert!(matches!(
            Provider::new(c).unwrap_err(),
            ProviderError::NotAMap("object.params")
        ));
    }

    #[test]
    fn patterns_compile_case_insensitive() {
        let provider = Provider::new(ProviderConfig::new([r"vimeo\.com/(\d+)"])).unwrap();
        assert!(provider.matches("https://VIMEO.com/123"));
        assert!(!provider.matches("https://example.com/123"));
    }

    #[test]
    fn table_reports_failing_index() {
        let err = ProviderTable::new(vec![
            ProviderConfig::new(["ok"]),
            ProviderConfig::new(["(unclosed"]),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Provider { index: 1, .. }));
    }

    #[test]
    fn data_callback_is_attached() {
        let provider = Provider::new(ProviderConfig::new(["x"]))
            .unwrap()
            .with_data_callback(|_| serde_json::json!({"views": 1}));
        assert!(provider.data_callback().is_some());
        assert!(format!("{provider:?}").contains("data_callback: true"));
    }
}
