//! `media-embed` - Media URL to embed markup
//!
//! # Features
//!
//! - **Provider table**: ordered regex patterns per media source, loaded from TOML/JSON
//! - **Templates**: `{n}` placeholders filled from URL capture groups
//! - **Overrides**: caller attributes/params merged over provider defaults
//! - **Rendering**: iframe, object/embed fallback, optional script tag
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use media_embed::{EmbedSession, ProviderTable};
//!
//! # fn main() -> anyhow::Result<()> {
//! let providers = Arc::new(ProviderTable::from_toml_str(r#"
//! [[providers]]
//! url = "vimeo\\.com/(\\d+)"
//! [providers.render]
//! sizeRatio = 1.77
//! [providers.render.iframe]
//! src = "https://player.vimeo.com/video/{1}"
//! "#)?);
//!
//! let mut session = EmbedSession::with_url(providers, "https://vimeo.com/76979871");
//! if session.parse_url().is_ok() {
//!     println!("{}", session.html_code().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod matcher;
pub mod merge;
pub mod provider;
pub mod render;
pub mod session;
pub mod template;

pub use error::{ConfigError, ProviderError, Unresolved};
pub use matcher::{match_url, Captures, Match};
pub use merge::{merge, Attributes};
pub use provider::{DataCallback, Provider, ProviderConfig, ProviderTable};
pub use render::{render_html, render_iframe, render_object, render_script};
pub use session::{EmbedConfig, EmbedSession, ProviderSnapshot};
pub use template::{substitute, Scalar, TemplateMap, TemplateNode};

/// Version of media-embed
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
