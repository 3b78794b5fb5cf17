//! `media-embed` CLI - Resolve media URLs to embed markup

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use media_embed::{EmbedSession, ProviderTable, Scalar};

#[derive(Parser)]
#[command(name = "media-embed")]
#[command(about = "Resolve media URLs against a provider table and print embed markup")]
#[command(version)]
struct Cli {
    /// Provider table (TOML or JSON). Defaults to ~/.config/media-embed/providers.toml
    #[arg(short = 'P', long, global = true)]
    providers: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a URL and print its markup
    Resolve {
        /// Media URL
        url: String,

        /// HTML attribute override (key=value), repeatable
        #[arg(short, long = "attr", value_parser = parse_pair)]
        attributes: Vec<(String, Scalar)>,

        /// Plugin parameter override (key=value), repeatable
        #[arg(short, long = "param", value_parser = parse_pair)]
        params: Vec<(String, Scalar)>,

        /// What to print
        #[arg(short, long, value_enum, default_value = "html")]
        format: OutputFormat,
    },

    /// List installed providers and their URL patterns
    Providers,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Iframe, falling back to object
    Html,
    Iframe,
    Object,
    Script,
    /// Resolved provider as JSON
    Json,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pipeable.
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let table = load_table(cli.providers.as_ref())?;

    match cli.command {
        Commands::Resolve {
            url,
            attributes,
            params,
            format,
        } => {
            cmd_resolve(table, &url, attributes, params, format)?;
        }
        Commands::Providers => {
            cmd_providers(&table);
        }
    }

    Ok(())
}

fn load_table(path: Option<&PathBuf>) -> Result<Arc<ProviderTable>> {
    let table = match path {
        Some(path) => ProviderTable::load(path)
            .with_context(|| format!("failed to load providers from {}", path.display()))?,
        None => ProviderTable::load_default().context("failed to load default providers")?,
    };
    Ok(Arc::new(table))
}

fn cmd_resolve(
    table: Arc<ProviderTable>,
    url: &str,
    attributes: Vec<(String, Scalar)>,
    params: Vec<(String, Scalar)>,
    format: OutputFormat,
) -> Result<()> {
    if table.is_empty() {
        bail!("no providers installed");
    }

    let mut session = EmbedSession::with_url(table, url);
    session.set_attributes(attributes).set_params(params);
    session.parse_url()?.parse_data();

    let output = match format {
        OutputFormat::Html => session.html_code(),
        OutputFormat::Iframe => session.iframe_code(),
        OutputFormat::Object => session.object_code(),
        OutputFormat::Script => session.script_code(),
        OutputFormat::Json => session
            .provider()
            .map(|snapshot| serde_json::to_string_pretty(&snapshot))
            .transpose()?,
    };

    match output {
        Some(text) => {
            println!("{text}");
            Ok(())
        }
        None => bail!("provider for {url} has no markup of the requested kind"),
    }
}

fn cmd_providers(table: &ProviderTable) {
    for (index, provider) in table.iter().enumerate() {
        println!("#{index}");
        for pattern in provider.pattern_sources() {
            println!("  {pattern}");
        }
    }
    println!("\n({} providers)", table.len());
}

fn parse_pair(raw: &str) -> Result<(String, Scalar), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), Scalar::parse_loose(value)))
}
