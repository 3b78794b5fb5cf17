//! Stateful embed resolution for a single URL.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use media_embed::{EmbedSession, ProviderTable};
//!
//! let providers = Arc::new(ProviderTable::from_toml_str(r#"
//! [[providers]]
//! url = "youtube\\.com/watch\\?v=([A-Za-z0-9_-]+)"
//! [providers.render]
//! sizeRatio = 1.77
//! [providers.render.iframe]
//! src = "https://youtube.com/embed/{1}"
//! "#).unwrap());
//!
//! let mut session = EmbedSession::with_url(providers, "https://youtube.com/watch?v=abc123");
//! session.set_attribute("width", 640);
//! session.parse_url().unwrap();
//!
//! let html = session.html_code().unwrap();
//! assert!(html.contains(r#"src="https://youtube.com/embed/abc123""#));
//! assert!(html.contains(r#"width="640""#));
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Unresolved;
use crate::matcher::Captures;
use crate::merge::{merge, Attributes};
use crate::provider::{Provider, ProviderTable};
use crate::render;
use crate::template::{substitute, Scalar, TemplateMap};

/// Initial attributes and params for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedConfig {
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub params: Attributes,
}

/// Session-owned working copy of a matched provider.
#[derive(Debug, Clone)]
struct Resolution {
    provider: Arc<Provider>,
    captures: Captures,
    info: TemplateMap,
    /// Substituted, never merged.
    base_render: TemplateMap,
    render: TemplateMap,
    data: Option<serde_json::Value>,
}

/// Serializable view of the resolved provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSnapshot {
    pub url: Vec<String>,
    pub info: TemplateMap,
    pub render: TemplateMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Resolves one URL against a provider table and renders its markup.
///
/// A session is owned by one caller; share the [`ProviderTable`] instead of
/// the session when embedding many URLs.
#[derive(Debug, Clone)]
pub struct EmbedSession {
    url: Option<String>,
    attributes: Attributes,
    params: Attributes,
    providers: Arc<ProviderTable>,
    resolved: Option<Resolution>,
}

impl EmbedSession {
    /// Empty session without a URL.
    pub fn new(providers: Arc<ProviderTable>) -> Self {
        Self {
            url: None,
            attributes: Attributes::new(),
            params: Attributes::new(),
            providers,
            resolved: None,
        }
    }

    /// Session for `url`. Nothing is matched until [`parse_url`](Self::parse_url).
    pub fn with_url(providers: Arc<ProviderTable>, url: impl Into<String>) -> Self {
        let mut session = Self::new(providers);
        session.url = Some(url.into());
        session
    }

    /// Replace the initial attributes and params.
    #[must_use]
    pub fn with_config(mut self, config: EmbedConfig) -> Self {
        self.attributes = config.attributes;
        self.params = config.params;
        self.refresh();
        self
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Scalar>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self.refresh();
        self
    }

    /// Set several attributes at once; later pairs win.
    pub fn set_attributes<I, K, V>(&mut self, attributes: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        for (key, value) in attributes {
            self.attributes.insert(key.into(), value.into());
        }
        self.refresh();
        self
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<Scalar>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self.refresh();
        self
    }

    /// Set several params at once; later pairs win.
    pub fn set_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        for (key, value) in params {
            self.params.insert(key.into(), value.into());
        }
        self.refresh();
        self
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn params(&self) -> &Attributes {
        &self.params
    }

    /// Install a different provider table. An existing resolution is kept
    /// until the next [`parse_url`](Self::parse_url).
    pub fn set_providers(&mut self, providers: Arc<ProviderTable>) {
        self.providers = providers;
    }

    pub fn providers(&self) -> &Arc<ProviderTable> {
        &self.providers
    }

    /// Match the URL against the provider table.
    ///
    /// On success the provider's `info` and `render` templates are
    /// substituted with the URL captures and the current attributes/params
    /// are merged in. On failure any previous resolution is dropped.
    pub fn parse_url(&mut self) -> Result<&mut Self, Unresolved> {
        let Some(url) = self.url.as_deref() else {
            self.resolved = None;
            return Err(Unresolved::NoUrlSet);
        };

        let Some(found) = self.providers.find(url) else {
            self.resolved = None;
            return Err(Unresolved::NoProviderMatch(url.to_string()));
        };

        let info = substitute(found.provider.info(), &found.captures);
        let base_render = substitute(found.provider.render(), &found.captures);
        let render = merge(
            &base_render,
            &self.attributes,
            &self.params,
            found.provider.size_ratio(),
        );

        self.resolved = Some(Resolution {
            provider: found.provider,
            captures: found.captures,
            info,
            base_render,
            render,
            data: None,
        });
        Ok(self)
    }

    /// Run the matched provider's data callback and keep its result.
    ///
    /// No-op when nothing is matched or the provider has no callback.
    pub fn parse_data(&mut self) -> &mut Self {
        let callback = self
            .resolved
            .as_ref()
            .and_then(|r| r.provider.data_callback().cloned());

        if let Some(callback) = callback {
            tracing::debug!("Running data callback for {:?}", self.url);
            let data = callback(&*self);
            if let Some(resolved) = self.resolved.as_mut() {
                resolved.data = Some(data);
            }
        }
        self
    }

    pub fn is_matched(&self) -> bool {
        self.resolved.is_some()
    }

    /// Capture groups of the last successful match.
    pub fn captures(&self) -> Option<&Captures> {
        self.resolved.as_ref().map(|r| &r.captures)
    }

    /// Substituted `info` tree.
    pub fn info(&self) -> Option<&TemplateMap> {
        self.resolved.as_ref().map(|r| &r.info)
    }

    /// Merged `render` tree.
    pub fn render_tree(&self) -> Option<&TemplateMap> {
        self.resolved.as_ref().map(|r| &r.render)
    }

    /// Data stored by [`parse_data`](Self::parse_data).
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.resolved.as_ref().and_then(|r| r.data.as_ref())
    }

    /// Iframe markup if available, otherwise object markup.
    pub fn html_code(&self) -> Option<String> {
        self.render_tree().and_then(render::render_html)
    }

    pub fn iframe_code(&self) -> Option<String> {
        self.render_tree().and_then(render::render_iframe)
    }

    pub fn object_code(&self) -> Option<String> {
        self.render_tree().and_then(render::render_object)
    }

    pub fn script_code(&self) -> Option<String> {
        self.render_tree().and_then(render::render_script)
    }

    /// Snapshot of the resolved and merged provider.
    pub fn provider(&self) -> Option<ProviderSnapshot> {
        self.resolved.as_ref().map(|r| ProviderSnapshot {
            url: r.provider.pattern_sources().to_vec(),
            info: r.info.clone(),
            render: r.render.clone(),
            data: r.data.clone(),
        })
    }

    /// Re-derive the merged tree from the substituted base.
    fn refresh(&mut self) {
        if let Some(resolved) = self.resolved.as_mut() {
            resolved.render = merge(
                &resolved.base_render,
                &self.attributes,
                &self.params,
                resolved.provider.size_ratio(),
            );
            tracing::trace!("Re-merged render tree for {:?}", self.url);
        }
    }
}
